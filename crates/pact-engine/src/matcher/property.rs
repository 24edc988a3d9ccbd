//! Per-field matchers that replace default equality for a field name.

use super::compare::match_values;
use super::failure::{MatchFailure, MismatchKind};
use super::options::MatchOptions;
use super::registry::PropertyMatcherRegistry;
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Overrides default equality for one field.
///
/// Both sides are optional: a field may be absent on either side. Failures
/// may be returned unlocated; the caller attaches the breadcrumb.
pub trait PropertyMatcher: Send + Sync + Debug {
    fn match_property(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
        options: &MatchOptions,
    ) -> Result<(), MatchFailure>;
}

/// Name of a JSON value's runtime type.
pub fn json_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Accepts any value.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreMatcher;

impl PropertyMatcher for IgnoreMatcher {
    fn match_property(
        &self,
        _actual: Option<&Value>,
        _expected: Option<&Value>,
        _options: &MatchOptions,
    ) -> Result<(), MatchFailure> {
        Ok(())
    }
}

/// The actual value must be a number.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberMatcher;

impl PropertyMatcher for NumberMatcher {
    fn match_property(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
        options: &MatchOptions,
    ) -> Result<(), MatchFailure> {
        match actual {
            Some(Value::Number(_)) => Ok(()),
            other => Err(type_failure(options, "a number", other)),
        }
    }
}

/// The actual value must be an ISO-8601 date-time string.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeMatcher;

impl DateTimeMatcher {
    pub fn is_date_time(text: &str) -> bool {
        DateTime::parse_from_rfc3339(text).is_ok()
            || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
            || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z").is_ok()
    }
}

impl PropertyMatcher for DateTimeMatcher {
    fn match_property(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
        options: &MatchOptions,
    ) -> Result<(), MatchFailure> {
        match actual {
            Some(Value::String(text)) if Self::is_date_time(text) => Ok(()),
            Some(Value::String(text)) => Err(options.fail(
                MismatchKind::ValueMismatch,
                format!("'{text}' is not an ISO-8601 date-time"),
                actual,
                None,
            )),
            other => Err(type_failure(options, "a date-time string", other)),
        }
    }
}

/// Both sides must have the same runtime type; values are not compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameTypeMatcher;

impl PropertyMatcher for SameTypeMatcher {
    fn match_property(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
        options: &MatchOptions,
    ) -> Result<(), MatchFailure> {
        let actual_type = json_type_name(actual);
        let expected_type = json_type_name(expected);
        if actual_type == expected_type {
            Ok(())
        } else {
            Err(options.fail(
                MismatchKind::TypeMismatch,
                format!("expected a value of type {expected_type} but got {actual_type}"),
                actual,
                expected,
            ))
        }
    }
}

/// The actual value must be a non-empty string of ASCII digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericIdMatcher;

impl PropertyMatcher for NumericIdMatcher {
    fn match_property(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
        options: &MatchOptions,
    ) -> Result<(), MatchFailure> {
        match actual {
            Some(Value::String(text)) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => Ok(()),
            Some(Value::String(text)) => Err(options.fail(
                MismatchKind::ValueMismatch,
                format!("'{text}' is not a numeric identifier"),
                actual,
                None,
            )),
            other => Err(type_failure(options, "a numeric string", other)),
        }
    }
}

/// Compares the field with the generic matcher under another registry.
#[derive(Debug, Clone)]
pub struct RegistryMatcher {
    registry: Arc<PropertyMatcherRegistry>,
}

impl RegistryMatcher {
    pub fn new(registry: Arc<PropertyMatcherRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PropertyMatcherRegistry {
        &self.registry
    }
}

impl PropertyMatcher for RegistryMatcher {
    fn match_property(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
        options: &MatchOptions,
    ) -> Result<(), MatchFailure> {
        match (actual, expected) {
            (Some(actual), Some(expected)) => match_values(actual, expected, options, &self.registry),
            (None | Some(Value::Null), None | Some(Value::Null)) => Ok(()),
            (None, Some(_)) => Err(options.fail(
                MismatchKind::MissingField,
                "field is missing from the actual value",
                actual,
                expected,
            )),
            (Some(_), None) if options.strict_matching => Err(options.fail(
                MismatchKind::MissingField,
                "unexpected field is not present in the fixture",
                actual,
                expected,
            )),
            (Some(_), None) => Ok(()),
        }
    }
}

fn type_failure(options: &MatchOptions, wanted: &str, actual: Option<&Value>) -> MatchFailure {
    options.fail(
        MismatchKind::TypeMismatch,
        format!("expected {wanted} but got {}", json_type_name(actual)),
        actual,
        None,
    )
}
