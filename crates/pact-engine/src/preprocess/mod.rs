//! Field-level normalization of recorded interactions.
//!
//! The preprocessor runs a fixed pipeline over a record, each stage acting on
//! the output of the previous one:
//!
//! 1. **pick** - keep only what the allow-list reaches
//! 2. **regex-rewrite** - apply `/pattern/replacement/flags` expressions
//! 3. **redact** - replace leaves with the obfuscation pattern
//! 4. **delete** - remove leaves
//!
//! Paths that do not resolve are skipped; no stage ever fails.
//!
//! # Configuration Example
//!
//! ```yaml
//! preprocess:
//!   ignore:
//!     - response.headers.date
//!   obfuscate:
//!     - request.headers.Authorization
//!     - request.headers.cookie.session
//!   regexReplace:
//!     request.url: "/\\d+/{id}/g"
//!   ignoreCase: true
//! ```
//!
//! # Module Structure
//!
//! - `options` - [`PreprocessOptions`] and layered resolution
//! - `pick`, `regex_replace`, `obfuscate`, `ignore` - the four stages
//! - `cookie` - addressing a single cookie inside a cookie header

mod cookie;
mod ignore;
mod obfuscate;
mod options;
mod pick;
mod regex_replace;

pub use options::{Patterns, PickSpec, PreprocessOptions, DEFAULT_OBFUSCATION_PATTERN};
pub use regex_replace::{validate_expression, RewriteError, RewriteRule};

use options::EffectiveOptions;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Applies [`PreprocessOptions`] to records and documents.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    defaults: PreprocessOptions,
}

impl Preprocessor {
    /// A preprocessor whose instance-level options are `defaults`.
    pub fn new(defaults: PreprocessOptions) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &PreprocessOptions {
        &self.defaults
    }

    /// Normalize `target` in place.
    ///
    /// A value with a `records` array is treated as a document and every
    /// record is processed in order; anything else is a single record.
    /// `options` are layered over the instance defaults.
    pub fn apply(&self, target: &mut Value, options: Option<&PreprocessOptions>) {
        let effective = match options {
            Some(call) => call.merged_over(&self.defaults).effective(),
            None => self.defaults.effective(),
        };

        match target.get_mut("records") {
            Some(Value::Array(records)) => {
                debug!("Preprocessing document with {} records", records.len());
                for record in records.iter_mut() {
                    run_pipeline(record, &effective);
                }
            }
            _ => run_pipeline(target, &effective),
        }
    }

    /// Normalize a typed value by passing it through its JSON form.
    ///
    /// `target` is only replaced when the normalized JSON converts back into
    /// `T`; otherwise it is left untouched and the conversion error returned.
    pub fn apply_to<T>(
        &self,
        target: &mut T,
        options: Option<&PreprocessOptions>,
    ) -> Result<(), serde_json::Error>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut value = serde_json::to_value(&*target)?;
        self.apply(&mut value, options);
        *target = serde_json::from_value(value)?;
        Ok(())
    }
}

fn run_pipeline(record: &mut Value, options: &EffectiveOptions) {
    let ignore_case = options.ignore_case;

    if let Some(spec) = &options.pick {
        pick::apply(record, spec, ignore_case);
    }
    for (path, expressions) in &options.regex_replace {
        regex_replace::apply(record, path, expressions, ignore_case);
    }
    for path in &options.obfuscate {
        obfuscate::apply(record, path, &options.mask, ignore_case);
    }
    for path in &options.ignore {
        ignore::apply(record, path, ignore_case);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "request": {
                "method": "POST",
                "url": "/users/42?token=abc",
                "headers": {"Authorization": "Bearer abc123", "Cookie": "sid=s1; theme=dark"},
                "body": {"password": "hunter2", "name": "Alice"}
            },
            "response": {
                "status": 201,
                "headers": {"Date": "Mon, 01 Jan 2024 00:00:00 GMT"},
                "body": {"id": 42}
            },
            "auth": {"user": "alice"}
        })
    }

    #[test]
    fn test_full_pipeline() {
        let options = PreprocessOptions::new()
            .pick(PickSpec::Keys(vec!["request".into(), "response".into()]))
            .regex_replace("request.url", "/token=\\w+/token={token}/")
            .obfuscate(["request.headers.authorization", "request.body.password", "request.headers.cookie.sid"])
            .ignore(["response.headers.date"])
            .ignore_case(true);

        let mut value = record();
        Preprocessor::default().apply(&mut value, Some(&options));

        assert!(value.get("auth").is_none());
        assert_eq!(value["request"]["url"], json!("/users/42?token={token}"));
        assert_eq!(value["request"]["headers"]["Authorization"], json!("Bearer ****"));
        assert_eq!(value["request"]["headers"]["Cookie"], json!("sid=****; theme=dark"));
        assert_eq!(value["request"]["body"]["password"], json!("****"));
        assert_eq!(value["response"]["headers"], json!({}));
    }

    #[test]
    fn test_redact_runs_after_regex_rewrite() {
        let options = PreprocessOptions::new()
            .regex_replace("request.body.password", "/hunter/HUNTER/")
            .obfuscate(["request.body.password"]);
        let mut value = record();
        Preprocessor::default().apply(&mut value, Some(&options));
        assert_eq!(value["request"]["body"]["password"], json!("****"));
    }

    #[test]
    fn test_delete_runs_after_redact() {
        let options = PreprocessOptions::new()
            .obfuscate(["request.body.password"])
            .ignore(["request.body.password"]);
        let mut value = record();
        Preprocessor::default().apply(&mut value, Some(&options));
        assert!(value["request"]["body"].get("password").is_none());
    }

    #[test]
    fn test_document_records_processed_in_order() {
        let preprocessor = Preprocessor::new(PreprocessOptions::new().ignore(["auth"]));
        let mut document = json!({
            "id": "pact-1",
            "info": {"consumer": "web"},
            "records": [record(), {"request": {"url": "/b"}, "auth": {"user": "bob"}}]
        });
        preprocessor.apply(&mut document, None);

        let records = document["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.get("auth").is_none()));
        assert_eq!(records[1]["request"]["url"], json!("/b"));
        assert_eq!(document["info"], json!({"consumer": "web"}));
    }

    #[test]
    fn test_call_options_override_instance_defaults() {
        let preprocessor = Preprocessor::new(
            PreprocessOptions::new()
                .obfuscate(["request.body.name"])
                .obfuscation_pattern("[x]"),
        );
        let mut value = record();
        preprocessor.apply(&mut value, Some(&PreprocessOptions::new().obfuscate(["request.body.password"])));
        assert_eq!(value["request"]["body"]["password"], json!("[x]"));
        assert_eq!(value["request"]["body"]["name"], json!("Alice"));
    }

    #[test]
    fn test_apply_to_typed_value() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Login {
            user: String,
            password: String,
        }

        let mut login = Login {
            user: "alice".into(),
            password: "secret".into(),
        };
        let preprocessor = Preprocessor::new(PreprocessOptions::new().obfuscate(["password"]));
        preprocessor.apply_to(&mut login, None).unwrap();
        assert_eq!(login.password, "****");

        let dropping = Preprocessor::new(PreprocessOptions::new().ignore(["password"]));
        assert!(dropping.apply_to(&mut login, None).is_err());
        assert_eq!(login.user, "alice");
        assert_eq!(login.password, "****");
    }
}
