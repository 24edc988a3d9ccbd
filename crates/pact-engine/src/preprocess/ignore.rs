//! The delete stage.

use super::cookie::{self, CookieEdit};
use crate::path::{resolve, KeyPath};
use serde_json::Value;
use tracing::debug;

/// Remove every leaf `path` resolves to.
pub(crate) fn apply(record: &mut Value, path: &KeyPath, ignore_case: bool) {
    if let Some(target) = cookie::cookie_target(path) {
        if cookie::apply(record, &target, CookieEdit::Remove, ignore_case) {
            return;
        }
    }

    let mut locations = resolve(record, path, ignore_case);
    if locations.is_empty() {
        debug!("Nothing to delete at {}", path);
        return;
    }

    // Back to front, so array indices of pending removals stay valid
    locations.sort();
    for location in locations.iter().rev() {
        location.remove(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delete(record: &mut Value, path: &str) {
        apply(record, &KeyPath::parse(path), false);
    }

    #[test]
    fn test_delete_nested_field() {
        let mut record = json!({"response": {"headers": {"date": "x", "etag": "y"}}});
        delete(&mut record, "response.headers.date");
        assert_eq!(record, json!({"response": {"headers": {"etag": "y"}}}));
    }

    #[test]
    fn test_delete_array_elements_back_to_front() {
        let mut record = json!({"items": [1, 2, 3, 4]});
        apply(&mut record, &KeyPath::parse("items[1]"), false);
        apply(&mut record, &KeyPath::parse("items[2]"), false);
        assert_eq!(record, json!({"items": [1, 3]}));
    }

    #[test]
    fn test_delete_fans_out() {
        let mut record = json!({"items": [{"id": 1, "tmp": true}, {"id": 2, "tmp": false}]});
        delete(&mut record, "items.tmp");
        assert_eq!(record, json!({"items": [{"id": 1}, {"id": 2}]}));
    }

    #[test]
    fn test_delete_nested_arrays_keeps_indices_valid() {
        let mut record = json!({"rows": [[{"x": 1}, {"x": 2}], [{"x": 3}]]});
        delete(&mut record, "..x");
        assert_eq!(record, json!({"rows": [[{}, {}], [{}]]}));
    }

    #[test]
    fn test_delete_cookie() {
        let mut record = json!({"request": {"headers": {"cookie": "authorization=secret; XSRF-TOKEN=token"}}});
        delete(&mut record, "request.headers.cookie.authorization");
        assert_eq!(record["request"]["headers"]["cookie"], json!("XSRF-TOKEN=token"));
    }

    #[test]
    fn test_unresolved_path_is_noop() {
        let original = json!({"a": [1]});
        let mut record = original.clone();
        delete(&mut record, "a[3]");
        delete(&mut record, "missing.path");
        assert_eq!(record, original);
    }
}
