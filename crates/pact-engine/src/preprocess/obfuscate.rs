//! The redact stage.

use super::cookie::{self, CookieEdit};
use crate::auth;
use crate::path::{resolve, KeyPath};
use serde_json::Value;
use tracing::debug;

/// Replace every leaf `path` resolves to with `mask`.
///
/// An authorization value with a `Bearer`/`Basic` scheme keeps the scheme
/// word and has only its token masked.
pub(crate) fn apply(record: &mut Value, path: &KeyPath, mask: &str, ignore_case: bool) {
    if let Some(target) = cookie::cookie_target(path) {
        if cookie::apply(record, &target, CookieEdit::Redact(mask), ignore_case) {
            return;
        }
    }

    let locations = resolve(record, path, ignore_case);
    if locations.is_empty() {
        debug!("Nothing to redact at {}", path);
        return;
    }

    for location in locations {
        let is_auth = location
            .last_key()
            .is_some_and(|key| auth::is_authorization(key, true));
        let Some(value) = location.get_mut(record) else {
            continue;
        };
        *value = Value::String(masked(value, is_auth, mask));
    }
}

fn masked(value: &Value, is_auth: bool, mask: &str) -> String {
    if is_auth {
        if let Some((scheme, _)) = value.as_str().and_then(auth::split_scheme) {
            return format!("{scheme} {mask}");
        }
    }
    mask.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn redact(record: &mut Value, path: &str, ignore_case: bool) {
        apply(record, &KeyPath::parse(path), "****", ignore_case);
    }

    #[test]
    fn test_authorization_keeps_scheme() {
        let mut record = json!({"request": {"headers": {"Authorization": "Bearer abc123", "x-token": "Bearer abc123"}}});
        redact(&mut record, "request.headers.Authorization", false);
        redact(&mut record, "request.headers.x-token", false);
        assert_eq!(record["request"]["headers"]["Authorization"], json!("Bearer ****"));
        assert_eq!(record["request"]["headers"]["x-token"], json!("****"));
    }

    #[test]
    fn test_authorization_scheme_casing_and_empty_token() {
        let mut record = json!({"a": {"authorization": "basic dXNlcg=="}, "b": {"authorization": "Bearer "}});
        redact(&mut record, "a.AUTHORIZATION", true);
        redact(&mut record, "b.authorization", false);
        assert_eq!(record["a"]["authorization"], json!("basic ****"));
        assert_eq!(record["b"]["authorization"], json!("****"));
    }

    #[test]
    fn test_redacts_any_value_type() {
        let mut record = json!({"body": {"user": {"password": 1234}, "list": [{"password": {"x": 1}}]}});
        redact(&mut record, "body..password", false);
        assert_eq!(
            record,
            json!({"body": {"user": {"password": "****"}, "list": [{"password": "****"}]}})
        );
    }

    #[test]
    fn test_redacts_single_cookie() {
        let mut record = json!({"request": {"headers": {"Cookie": "sid=abc; theme=dark"}}});
        redact(&mut record, "request.headers.cookie.sid", true);
        assert_eq!(record["request"]["headers"]["Cookie"], json!("sid=****; theme=dark"));
    }

    #[test]
    fn test_unresolved_path_is_noop() {
        let original = json!({"a": 1});
        let mut record = original.clone();
        redact(&mut record, "b.c", false);
        assert_eq!(record, original);
    }
}
