//! Recursive structural comparison.

use super::array::match_arrays;
use super::failure::{MatchFailure, MismatchKind};
use super::options::MatchOptions;
use super::registry::PropertyMatcherRegistry;
use super::schema::schema_target;
use crate::auth;
use crate::path::{lookup_key, names_equal};
use serde_json::{Map, Value};

/// Compare `actual` against `expected`.
///
/// Returns `Ok(())` on a match, or a failure located at the breadcrumb where
/// the first difference was found.
pub fn match_values(
    actual: &Value,
    expected: &Value,
    options: &MatchOptions,
    registry: &PropertyMatcherRegistry,
) -> Result<(), MatchFailure> {
    if std::ptr::eq(actual, expected) {
        return Ok(());
    }

    match (actual, expected) {
        (Value::String(a), Value::String(e)) => {
            if a == e {
                Ok(())
            } else {
                Err(options.fail(
                    MismatchKind::TextMismatch,
                    format!("expected '{e}' but got '{a}'"),
                    Some(actual),
                    Some(expected),
                ))
            }
        }
        (Value::Array(_), Value::Array(_)) => match_arrays(actual, expected, options, registry),
        (Value::Object(a), Value::Object(e)) => match_objects(a, e, options, registry),
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            Err(options.fail(
                MismatchKind::TypeMismatch,
                format!(
                    "expected {} but got {}",
                    describe(expected),
                    describe(actual)
                ),
                Some(actual),
                Some(expected),
            ))
        }
        _ if primitives_equal(actual, expected) => Ok(()),
        _ => {
            let message = if options.at_root() {
                format!("expected two composite values but got {actual} and {expected}")
            } else {
                format!("expected {expected} but got {actual}")
            };
            Err(options.fail(
                MismatchKind::ValueMismatch,
                message,
                Some(actual),
                Some(expected),
            ))
        }
    }
}

/// Compare one named field of two objects, consulting the registry first.
///
/// `parent_options` are the options of the enclosing object; the field name
/// is appended to the breadcrumb here.
pub fn match_field(
    name: &str,
    actual: Option<&Value>,
    expected: Option<&Value>,
    parent_options: &MatchOptions,
    registry: &PropertyMatcherRegistry,
) -> Result<(), MatchFailure> {
    let options = parent_options.child(name);

    if let Some(matcher) = registry.get(name, options.ignore_case) {
        return matcher
            .match_property(actual, expected, &options)
            .map_err(|failure| {
                if failure.is_located() {
                    failure
                } else {
                    options.report(failure.kind, &options.parents, actual, expected);
                    failure.locate(&options.parents)
                }
            });
    }

    match (actual, expected) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ok(()),
        (None, Some(_)) => Err(options.fail(
            MismatchKind::MissingField,
            format!("field '{name}' is missing from the actual value"),
            actual,
            expected,
        )),
        (Some(_), None) if options.strict_matching => Err(options.fail(
            MismatchKind::MissingField,
            format!("unexpected field '{name}' is not present in the fixture"),
            actual,
            expected,
        )),
        (Some(_), None) => Ok(()),
        (Some(Value::String(a)), Some(Value::String(e)))
            if auth::is_authorization(name, options.ignore_case) =>
        {
            if auth::strip_scheme(a) == auth::strip_scheme(e) {
                Ok(())
            } else {
                Err(options.fail(
                    MismatchKind::TextMismatch,
                    "authorization credentials do not match",
                    actual,
                    expected,
                ))
            }
        }
        (Some(a), Some(e)) => match_values(a, e, &options, registry),
    }
}

fn match_objects(
    actual: &Map<String, Value>,
    expected: &Map<String, Value>,
    options: &MatchOptions,
    registry: &PropertyMatcherRegistry,
) -> Result<(), MatchFailure> {
    let mut covered: Vec<&str> = Vec::new();
    for (key, schema) in expected {
        if let Some(target) = schema_target(key) {
            let value = lookup_key(actual, target, options.ignore_case).map(|(_, v)| v);
            check_schema(target, value, schema, options)?;
            covered.push(target);
        }
    }

    let (driver, other) = if options.strict_matching {
        (actual, expected)
    } else {
        (expected, actual)
    };

    for (key, value) in driver {
        if schema_target(key).is_some() {
            continue;
        }
        if !options.match_schema_and_object
            && covered
                .iter()
                .any(|target| names_equal(target, key, options.ignore_case))
        {
            continue;
        }

        let counterpart = lookup_key(other, key, options.ignore_case).map(|(_, v)| v);
        let (a, e) = if options.strict_matching {
            (Some(value), counterpart)
        } else {
            (counterpart, Some(value))
        };
        match_field(key, a, e, options, registry)?;
    }

    Ok(())
}

fn check_schema(
    target: &str,
    value: Option<&Value>,
    schema: &Value,
    parent_options: &MatchOptions,
) -> Result<(), MatchFailure> {
    let options = parent_options.child(target);
    let Some(validator) = &options.schema_validator else {
        return Err(options.fail(
            MismatchKind::SchemaMismatch,
            format!("no schema validator configured for '${target}'"),
            value,
            Some(schema),
        ));
    };

    validator
        .validate(value, schema, options.strict_matching)
        .map_err(|reason| {
            options.fail(
                MismatchKind::SchemaMismatch,
                format!("value does not satisfy schema '${target}': {reason}"),
                value,
                Some(schema),
            )
        })
}

/// Equality for non-composite values; numbers compare by value.
pub(super) fn primitives_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
        Value::String(_) => "a string",
        Value::Number(_) => "a number",
        Value::Bool(_) => "a boolean",
        Value::Null => "null",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{CollectingSink, IgnoreMatcher};
    use serde_json::json;
    use std::sync::Arc;

    fn check(actual: Value, expected: Value, options: &MatchOptions) -> Result<(), MatchFailure> {
        match_values(&actual, &expected, options, &PropertyMatcherRegistry::empty())
    }

    #[test]
    fn test_identical_values_match() {
        let value = json!({"a": [1, {"b": null}], "c": "x"});
        assert!(match_values(&value, &value, &MatchOptions::default(), &PropertyMatcherRegistry::empty()).is_ok());
        assert!(check(value.clone(), value.clone(), &MatchOptions::new().strict(true)).is_ok());
    }

    #[test]
    fn test_text_mismatch_is_located() {
        let err = check(
            json!({"body": {"name": "Bob"}}),
            json!({"body": {"name": "Alice"}}),
            &MatchOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind, MismatchKind::TextMismatch);
        assert_eq!(err.breadcrumb(), "body.name");
    }

    #[test]
    fn test_root_primitives() {
        let err = check(json!(1), json!(2), &MatchOptions::default()).unwrap_err();
        assert_eq!(err.kind, MismatchKind::ValueMismatch);
        assert!(err.message.contains("expected two composite values"));
        assert_eq!(err.breadcrumb(), "<root>");

        assert!(check(json!(1), json!(1.0), &MatchOptions::default()).is_ok());
        assert!(check(json!(null), json!(null), &MatchOptions::default()).is_ok());
    }

    #[test]
    fn test_nested_value_mismatch() {
        let err = check(json!({"n": 1}), json!({"n": 2}), &MatchOptions::default()).unwrap_err();
        assert_eq!(err.kind, MismatchKind::ValueMismatch);
        assert_eq!(err.message, "expected 2 but got 1");
    }

    #[test]
    fn test_type_mismatch() {
        let err = check(json!({"a": [1]}), json!({"a": {"x": 1}}), &MatchOptions::default()).unwrap_err();
        assert_eq!(err.kind, MismatchKind::TypeMismatch);
        assert_eq!(err.breadcrumb(), "a");

        let err = check(json!([1]), json!("x"), &MatchOptions::default()).unwrap_err();
        assert_eq!(err.kind, MismatchKind::TypeMismatch);
    }

    #[test]
    fn test_strictness_decides_driving_side() {
        let actual = json!({"a": 1, "extra": true});
        let expected = json!({"a": 1});
        assert!(check(actual.clone(), expected.clone(), &MatchOptions::default()).is_ok());

        let err = check(actual, expected, &MatchOptions::new().strict(true)).unwrap_err();
        assert_eq!(err.kind, MismatchKind::MissingField);
        assert!(err.message.contains("extra"));
        assert_eq!(err.breadcrumb(), "extra");
    }

    #[test]
    fn test_missing_field_in_actual() {
        let err = check(json!({}), json!({"name": "x"}), &MatchOptions::default()).unwrap_err();
        assert_eq!(err.kind, MismatchKind::MissingField);
        assert!(err.message.contains("'name'"));
    }

    #[test]
    fn test_field_only_in_actual_fails_only_when_strict() {
        let registry = PropertyMatcherRegistry::empty();
        let value = json!({"x": 1});
        assert!(match_field("body", Some(&value), None, &MatchOptions::default(), &registry).is_ok());

        let strict = MatchOptions::new().strict(true);
        let err = match_field("body", Some(&value), None, &strict, &registry).unwrap_err();
        assert_eq!(err.kind, MismatchKind::MissingField);
        assert_eq!(err.breadcrumb(), "body");
    }

    #[test]
    fn test_missing_and_null_are_nullish() {
        assert!(check(json!({}), json!({"a": null}), &MatchOptions::default()).is_ok());
        assert!(check(json!({"a": null}), json!({}), &MatchOptions::new().strict(true)).is_ok());
    }

    #[test]
    fn test_ignore_case_key_lookup() {
        let actual = json!({"Content-Type": "application/json"});
        let expected = json!({"content-type": "application/json"});
        assert!(check(actual.clone(), expected.clone(), &MatchOptions::default()).is_err());
        assert!(check(actual, expected, &MatchOptions::new().ignore_case(true)).is_ok());
    }

    #[test]
    fn test_authorization_scheme_is_interchangeable() {
        let options = MatchOptions::default();
        assert!(check(json!({"Authorization": "Bearer abc"}), json!({"Authorization": "Basic abc"}), &options).is_ok());
        assert!(check(json!({"Authorization": "abc"}), json!({"Authorization": "Bearer abc"}), &options).is_ok());

        let err = check(json!({"Authorization": "Bearer abc"}), json!({"Authorization": "Bearer xyz"}), &options)
            .unwrap_err();
        assert!(!err.message.contains("abc"));

        // Only the exact header name without ignore_case
        assert!(check(json!({"AUTHORIZATION": "Bearer abc"}), json!({"AUTHORIZATION": "Basic abc"}), &options).is_err());
        assert!(check(
            json!({"AUTHORIZATION": "Bearer abc"}),
            json!({"AUTHORIZATION": "Basic abc"}),
            &MatchOptions::new().ignore_case(true)
        )
        .is_ok());
    }

    #[test]
    fn test_schema_marker_without_validator_fails() {
        let err = check(
            json!({"body": {"a": 1}}),
            json!({"$body": {"type": "object"}}),
            &MatchOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind, MismatchKind::SchemaMismatch);
        assert_eq!(err.breadcrumb(), "body");
    }

    #[test]
    fn test_schema_marker_skips_literal_field() {
        let validator = |value: Option<&Value>, _schema: &Value, _strict: bool| {
            if value.is_some_and(Value::is_object) {
                Ok(())
            } else {
                Err("not an object".to_string())
            }
        };
        let options = MatchOptions::new().with_schema_validator(Arc::new(validator));
        let actual = json!({"body": {"a": 1}});
        let expected = json!({"$body": {"type": "object"}, "body": {"a": 2}});

        assert!(check(actual.clone(), expected.clone(), &options).is_ok());

        let both = options.clone().match_schema_and_object(true);
        let err = check(actual.clone(), expected.clone(), &both).unwrap_err();
        assert_eq!(err.kind, MismatchKind::ValueMismatch);
        assert_eq!(err.breadcrumb(), "body.a");

        let err = check(json!({"body": "text"}), expected, &options).unwrap_err();
        assert_eq!(err.kind, MismatchKind::SchemaMismatch);
        assert!(err.message.contains("not an object"));
    }

    #[test]
    fn test_registry_override_is_located() {
        #[derive(Debug)]
        struct AlwaysFails;
        impl crate::matcher::PropertyMatcher for AlwaysFails {
            fn match_property(
                &self,
                _actual: Option<&Value>,
                _expected: Option<&Value>,
                _options: &MatchOptions,
            ) -> Result<(), MatchFailure> {
                Err(MatchFailure::new(MismatchKind::ValueMismatch, "nope"))
            }
        }

        let registry = PropertyMatcherRegistry::empty()
            .with("ts", Arc::new(IgnoreMatcher))
            .with("code", Arc::new(AlwaysFails));
        let options = MatchOptions::default();

        let actual = json!({"ts": 1, "inner": {"code": 1}});
        let expected = json!({"ts": 2, "inner": {"code": 1}});
        let err = match_values(&actual, &expected, &options, &registry).unwrap_err();
        assert_eq!(err.breadcrumb(), "inner.code");
        assert_eq!(err.message, "nope");
    }

    #[test]
    fn test_diagnostics_receive_conflicting_values() {
        let sink = Arc::new(CollectingSink::new());
        let options = MatchOptions::new().with_diagnostics(sink.clone());
        let _ = check(json!({"a": {"b": "x"}}), json!({"a": {"b": "y"}}), &options);

        let conflicts = sink.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].breadcrumb(), "a.b");
        assert_eq!(conflicts[0].actual, Some(json!("x")));
        assert_eq!(conflicts[0].expected, Some(json!("y")));
    }
}
