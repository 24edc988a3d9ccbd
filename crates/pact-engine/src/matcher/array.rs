//! Array comparison.

use super::compare::{match_values, primitives_equal};
use super::failure::{MatchFailure, MismatchKind};
use super::options::MatchOptions;
use super::registry::PropertyMatcherRegistry;
use serde_json::Value;
use std::collections::HashMap;

/// Compare two arrays.
///
/// Lengths must always agree. Arrays made only of strings, numbers and
/// booleans compare as multisets when `ignore_primitive_array_order` is set;
/// anything else, `null` included, is compared position by position.
pub(super) fn match_arrays(
    actual: &Value,
    expected: &Value,
    options: &MatchOptions,
    registry: &PropertyMatcherRegistry,
) -> Result<(), MatchFailure> {
    let (Some(actual_items), Some(expected_items)) = (actual.as_array(), expected.as_array()) else {
        return Err(options.fail(
            MismatchKind::TypeMismatch,
            "expected two arrays",
            Some(actual),
            Some(expected),
        ));
    };

    if actual_items.len() != expected_items.len() {
        return Err(options.fail(
            MismatchKind::ArrayLengthMismatch,
            format!(
                "expected {} elements but got {}",
                expected_items.len(),
                actual_items.len()
            ),
            Some(actual),
            Some(expected),
        ));
    }

    let all_primitive = actual_items
        .iter()
        .chain(expected_items)
        .all(|item| item.is_string() || item.is_number() || item.is_boolean());

    if all_primitive {
        let outcome = if options.ignore_primitive_array_order {
            compare_multisets(actual_items, expected_items)
        } else {
            compare_ordered(actual_items, expected_items)
        };
        return outcome.map_err(|message| {
            options.fail(
                MismatchKind::ArrayElementMismatch,
                message,
                Some(actual),
                Some(expected),
            )
        });
    }

    for (index, (a, e)) in actual_items.iter().zip(expected_items).enumerate() {
        match_values(a, e, &options.child(format!("[{index}]")), registry)?;
    }
    Ok(())
}

/// Multiset key for a primitive; numbers are keyed by value.
fn element_key(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("n:{f}"),
            None => format!("n:{n}"),
        },
        Value::String(s) => format!("s:{s}"),
        other => other.to_string(),
    }
}

fn compare_multisets(actual: &[Value], expected: &[Value]) -> Result<(), String> {
    let mut remaining: HashMap<String, usize> = HashMap::new();
    for item in actual {
        *remaining.entry(element_key(item)).or_insert(0) += 1;
    }

    let mut missing = Vec::new();
    for item in expected {
        match remaining.get_mut(&element_key(item)) {
            Some(count) if *count > 0 => *count -= 1,
            _ => missing.push(item.to_string()),
        }
    }

    if missing.is_empty() {
        return Ok(());
    }

    let mut unexpected = Vec::new();
    for item in actual {
        if let Some(count) = remaining.get_mut(&element_key(item)) {
            if *count > 0 {
                *count -= 1;
                unexpected.push(item.to_string());
            }
        }
    }

    Err(format!(
        "array elements differ: missing [{}], unexpected [{}]",
        missing.join(", "),
        unexpected.join(", ")
    ))
}

fn compare_ordered(actual: &[Value], expected: &[Value]) -> Result<(), String> {
    let differing: Vec<String> = actual
        .iter()
        .zip(expected)
        .enumerate()
        .filter(|(_, (a, e))| !primitives_equal(a, e))
        .map(|(index, _)| index.to_string())
        .collect();

    if differing.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "array elements differ at indices [{}]",
            differing.join(", ")
        ))
    }
}
