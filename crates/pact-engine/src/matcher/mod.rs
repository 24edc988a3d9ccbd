//! Structural matching of recorded values.
//!
//! The matcher compares an `actual` value against an `expected` fixture value
//! and returns either `Ok(())` or a [`MatchFailure`] located at the breadcrumb
//! of the first difference.
//!
//! # Rules
//!
//! - Strings must be literally equal (`text-mismatch`).
//! - Non-strict matching iterates the expected keys, so extra actual fields
//!   are ignored. Strict matching iterates the actual keys, so every actual
//!   field must exist in the fixture.
//! - A missing field and `null` are both nullish and match each other.
//! - `$name` keys carry a schema for the sibling `name` field and are checked
//!   with the configured [`SchemaValidator`].
//! - Arrays of primitives compare as multisets unless
//!   `ignore_primitive_array_order` is off; other arrays compare by position.
//! - Field names found in the [`PropertyMatcherRegistry`] are delegated to
//!   their [`PropertyMatcher`] instead of default equality.
//!
//! # Example
//!
//! ```
//! use pact_engine::matcher::{Matcher, MatchOptions};
//! use serde_json::json;
//!
//! let matcher = Matcher::body();
//! let actual = json!({"id": "7f3a", "name": "Alice", "extra": true});
//! let expected = json!({"id": "91bc", "name": "Alice"});
//! assert!(matcher.check(&actual, &expected, &MatchOptions::default()).is_ok());
//! ```

mod array;
mod compare;
mod diagnostics;
mod failure;
mod options;
mod property;
mod registry;
mod schema;

pub use compare::{match_field, match_values};
pub use diagnostics::{render_diff, CollectingSink, Conflict, DiagnosticsSink, TracingSink};
pub use failure::{render_breadcrumb, MatchFailure, MismatchKind};
pub use options::MatchOptions;
pub use property::{
    json_type_name, DateTimeMatcher, IgnoreMatcher, NumberMatcher, NumericIdMatcher,
    PropertyMatcher, RegistryMatcher, SameTypeMatcher,
};
pub use registry::PropertyMatcherRegistry;
pub use schema::{schema_target, SchemaValidator, SCHEMA_MARKER};

use serde_json::Value;
use std::sync::Arc;

/// A matcher bound to a property matcher registry.
#[derive(Debug, Clone)]
pub struct Matcher {
    registry: Arc<PropertyMatcherRegistry>,
}

impl Matcher {
    pub fn new(registry: Arc<PropertyMatcherRegistry>) -> Self {
        Self { registry }
    }

    /// Matcher using [`PropertyMatcherRegistry::standard`].
    pub fn standard() -> Self {
        Self::new(Arc::new(PropertyMatcherRegistry::standard()))
    }

    /// Matcher using [`PropertyMatcherRegistry::body`].
    pub fn body() -> Self {
        Self::new(Arc::new(PropertyMatcherRegistry::body()))
    }

    pub fn registry(&self) -> &PropertyMatcherRegistry {
        &self.registry
    }

    pub fn check(
        &self,
        actual: &Value,
        expected: &Value,
        options: &MatchOptions,
    ) -> Result<(), MatchFailure> {
        match_values(actual, expected, options, &self.registry)
    }

    pub fn is_match(&self, actual: &Value, expected: &Value, options: &MatchOptions) -> bool {
        self.check(actual, expected, options).is_ok()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_matcher_routes_body() {
        let matcher = Matcher::standard();
        let actual = json!({
            "status": 201,
            "headers": {"date": "Mon, 01 Jan 2024 00:00:00 GMT"},
            "body": {"id": "a1", "createdAt": "2024-01-01T00:00:00Z", "name": "Alice"}
        });
        let expected = json!({
            "status": 201,
            "headers": {"date": "Tue, 02 Jan 2024 00:00:00 GMT"},
            "body": {"id": "b2", "createdAt": "2023-05-05T12:00:00Z", "name": "Alice"}
        });
        assert!(matcher.is_match(&actual, &expected, &MatchOptions::default()));

        let renamed = json!({
            "status": 201,
            "headers": {},
            "body": {"id": "a1", "createdAt": "2024-01-01T00:00:00Z", "name": "Bob"}
        });
        let err = matcher
            .check(&renamed, &expected, &MatchOptions::default())
            .unwrap_err();
        assert_eq!(err.breadcrumb(), "body.name");
    }

    #[test]
    fn test_body_fields_named_like_headers_are_compared() {
        let matcher = Matcher::body();
        let err = matcher
            .check(&json!({"age": 99}), &json!({"age": 30}), &MatchOptions::default())
            .unwrap_err();
        assert_eq!(err.kind, MismatchKind::ValueMismatch);
        assert_eq!(err.breadcrumb(), "age");

        assert!(!matcher.is_match(
            &json!({"date": "x", "duration": "slow"}),
            &json!({"date": "y", "duration": 5}),
            &MatchOptions::default()
        ));
    }

    #[test]
    fn test_body_matcher_rejects_bad_timestamp() {
        let matcher = Matcher::body();
        let err = matcher
            .check(
                &json!({"createdAt": "not a date"}),
                &json!({"createdAt": "2024-01-01T00:00:00Z"}),
                &MatchOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind, MismatchKind::ValueMismatch);
        assert_eq!(err.breadcrumb(), "createdAt");
    }
}
