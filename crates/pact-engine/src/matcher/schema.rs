//! Schema marker fields and the pluggable schema validator.

use serde_json::Value;

/// Prefix that marks a field as carrying the schema of its sibling.
pub const SCHEMA_MARKER: char = '$';

/// Validates a value against a JSON-schema-like structure.
///
/// The engine ships no validator; callers inject one through
/// [`MatchOptions::with_schema_validator`](super::MatchOptions::with_schema_validator)
/// or the engine config.
pub trait SchemaValidator: Send + Sync {
    /// Validate `value` (absent when the field is missing) against `schema`.
    /// `strict` mirrors the current matching strictness. An `Err` carries a
    /// human-readable reason.
    fn validate(&self, value: Option<&Value>, schema: &Value, strict: bool) -> Result<(), String>;
}

impl<F> SchemaValidator for F
where
    F: Fn(Option<&Value>, &Value, bool) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: Option<&Value>, schema: &Value, strict: bool) -> Result<(), String> {
        self(value, schema, strict)
    }
}

/// For a schema marker key (`$body`), the literal field it describes (`body`).
/// `$ref` is a reference, not a schema marker.
pub fn schema_target(key: &str) -> Option<&str> {
    let target = key.strip_prefix(SCHEMA_MARKER)?;
    if target.is_empty() || target == "ref" {
        None
    } else {
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_target() {
        assert_eq!(schema_target("$body"), Some("body"));
        assert_eq!(schema_target("body"), None);
        assert_eq!(schema_target("$ref"), None);
        assert_eq!(schema_target("$"), None);
    }

    #[test]
    fn test_closure_validator() {
        let validator = |value: Option<&Value>, _schema: &Value, _strict: bool| match value {
            Some(Value::String(_)) => Ok(()),
            _ => Err("expected a string".to_string()),
        };
        let schema = json!({"type": "string"});
        assert!(validator.validate(Some(&json!("x")), &schema, false).is_ok());
        assert!(validator.validate(None, &schema, false).is_err());
    }
}
