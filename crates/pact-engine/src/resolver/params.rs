//! Parameterized references: `{"$ref": "#/definitions/user?name=Alice&age=Int(30)"}`.

use crate::path::{Location, Step};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;

/// Key holding a reference inside an object.
pub const REF_KEY: &str = "$ref";

/// A typed query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    /// Decode `Int(n)`, `Float(n)` and `Bool(b)`; anything else is text.
    pub fn decode(raw: &str) -> Self {
        let typed = |prefix: &str| {
            raw.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('('))
                .and_then(|rest| rest.strip_suffix(')'))
                .map(str::trim)
        };

        if let Some(n) = typed("Int").and_then(|inner| inner.parse().ok()) {
            return ParamValue::Int(n);
        }
        if let Some(f) = typed("Float").and_then(|inner| inner.parse().ok()) {
            return ParamValue::Float(f);
        }
        if let Some(b) = typed("Bool").and_then(|inner| inner.parse().ok()) {
            return ParamValue::Bool(b);
        }
        ParamValue::Text(raw.to_string())
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Int(n) => Value::from(*n),
            ParamValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parse `a=1&b=Int(2)` into typed parameters. Keys and values are
/// URL-decoded; undecodable text is kept verbatim.
pub fn parse_query(query: &str) -> HashMap<String, ParamValue> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), ParamValue::decode(&decode_component(value)))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// A `$ref` that carried a query string, recorded during pre-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedRef {
    /// Location of the object that held the `$ref`
    pub container: Location,
    pub params: HashMap<String, ParamValue>,
    /// The reference text before the query was stripped
    pub original: String,
}

/// Strip query strings from every `$ref` in `root`, returning what was
/// stripped and where.
pub(crate) fn collect_parameterized(root: &mut Value) -> Vec<ParameterizedRef> {
    let mut found = Vec::new();
    collect(root, &Location::root(), &mut found);
    found
}

fn collect(node: &mut Value, location: &Location, found: &mut Vec<ParameterizedRef>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get_mut(REF_KEY) {
                if let Some((base, query)) = reference.split_once('?') {
                    found.push(ParameterizedRef {
                        container: location.clone(),
                        params: parse_query(query),
                        original: reference.clone(),
                    });
                    *reference = base.to_string();
                }
            }
            for (key, child) in map.iter_mut() {
                collect(child, &location.child(Step::Key(key.clone())), found);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                collect(item, &location.child(Step::Index(index)), found);
            }
        }
        _ => {}
    }
}
