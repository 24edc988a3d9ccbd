//! `{{name}}` placeholder substitution.

use super::params::ParamValue;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Regex for placeholders: {{name}}, {{ user.id }}, etc.
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}").unwrap()
    })
}

/// Deep-copy `value`, substituting placeholders in every string.
///
/// A string that is exactly one known placeholder becomes the parameter's
/// typed value; embedded placeholders are replaced by the parameter's text.
/// Unknown placeholders are left as they are.
pub fn substitute(value: &Value, params: &HashMap<String, ParamValue>) -> Value {
    match value {
        Value::String(text) => substitute_text(text, params),
        Value::Array(items) => Value::Array(items.iter().map(|item| substitute(item, params)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), substitute(child, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_text(text: &str, params: &HashMap<String, ParamValue>) -> Value {
    let regex = get_placeholder_regex();

    if let Some(captures) = regex.captures(text) {
        let whole = captures.get(0).map_or(0..0, |m| m.range());
        if whole == (0..text.len()) {
            if let Some(param) = params.get(&captures[1]) {
                return param.to_json();
            }
        }
    }

    let replaced = regex.replace_all(text, |captures: &Captures| match params.get(&captures[1]) {
        Some(param) => param.to_string(),
        None => captures[0].to_string(),
    });
    Value::String(replaced.into_owned())
}
