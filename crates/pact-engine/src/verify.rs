//! Verifying live interactions against recorded fixtures.

use crate::config::EngineConfig;
use crate::matcher::{match_field, MatchFailure, MatchOptions, PropertyMatcherRegistry};
use crate::model::{InteractionRecord, Metadata, PactDocument};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A sequence of live interactions that does not match a fixture document.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("expected {expected} interactions but got {actual}")]
    CountMismatch { actual: usize, expected: usize },

    #[error("interaction {index} does not match its fixture: {failure}")]
    Record {
        index: usize,
        #[source]
        failure: MatchFailure,
    },
}

/// Compares the response of a live interaction against a recorded one.
///
/// - `status` must be equal
/// - `headers` compare case-insensitively and non-strictly, so live
///   responses may carry extra headers; volatile headers are ignored
/// - `body` goes through the registry's `body` rule
///
/// Strictness and case handling come from the config and may be overridden
/// by the document's `info.strictMatching` or the fixture record's
/// `options.strictMatching` / `options.ignoreCase`.
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    config: Arc<EngineConfig>,
    registry: Arc<PropertyMatcherRegistry>,
}

impl InteractionVerifier {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            registry: Arc::new(PropertyMatcherRegistry::standard()),
        }
    }

    pub fn with_registry(mut self, registry: Arc<PropertyMatcherRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Verify one live record against its fixture.
    pub fn verify(
        &self,
        actual: &InteractionRecord,
        expected: &InteractionRecord,
    ) -> Result<(), MatchFailure> {
        self.verify_record(actual, expected, None)
    }

    /// Verify live records against a document's records, in order, stopping
    /// at the first failure.
    pub fn verify_all(
        &self,
        actual: &[InteractionRecord],
        expected: &PactDocument,
    ) -> Result<(), VerifyError> {
        if actual.len() != expected.records.len() {
            return Err(VerifyError::CountMismatch {
                actual: actual.len(),
                expected: expected.records.len(),
            });
        }

        for (index, (live, fixture)) in actual.iter().zip(&expected.records).enumerate() {
            debug!("Verifying interaction {} ({})", index, fixture.request.url);
            self.verify_record(live, fixture, Some(&expected.info))
                .map_err(|failure| VerifyError::Record { index, failure })?;
        }
        Ok(())
    }

    fn options_for(&self, expected: &InteractionRecord, info: Option<&Metadata>) -> MatchOptions {
        let mut options = self.config.match_options();
        if let Some(strict) = info.and_then(|info| info.strict_matching) {
            options.strict_matching = strict;
        }
        if let Some(strict) = expected.option_flag("strictMatching") {
            options.strict_matching = strict;
        }
        if let Some(ignore_case) = expected.option_flag("ignoreCase") {
            options.ignore_case = ignore_case;
        }
        options.with_parents(["response"])
    }

    fn verify_record(
        &self,
        actual: &InteractionRecord,
        expected: &InteractionRecord,
        info: Option<&Metadata>,
    ) -> Result<(), MatchFailure> {
        let options = self.options_for(expected, info);
        let live = &actual.response;
        let fixture = &expected.response;

        match_field(
            "status",
            Some(&Value::from(live.status)),
            Some(&Value::from(fixture.status)),
            &options,
            &self.registry,
        )?;

        let header_options = options.clone().ignore_case(true).strict(false);
        match_field(
            "headers",
            Some(&Value::Object(live.headers.clone())),
            Some(&Value::Object(fixture.headers.clone())),
            &header_options,
            &self.registry,
        )?;

        match_field(
            "body",
            live.body.as_ref(),
            fixture.body.as_ref(),
            &options,
            &self.registry,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MismatchKind;
    use serde_json::json;

    fn record(value: Value) -> InteractionRecord {
        serde_json::from_value(value).unwrap()
    }

    fn verifier() -> InteractionVerifier {
        InteractionVerifier::new(Arc::new(EngineConfig::default()))
    }

    fn fixture() -> InteractionRecord {
        record(json!({
            "request": {"method": "GET", "url": "/users/1"},
            "response": {
                "status": 200,
                "headers": {"content-type": "application/json", "date": "Mon, 01 Jan 2024 00:00:00 GMT"},
                "body": {"id": "u-1", "name": "Alice", "createdAt": "2024-01-01T00:00:00Z"}
            }
        }))
    }

    #[test]
    fn test_live_response_matches_fixture() {
        let live = record(json!({
            "response": {
                "status": 200,
                "headers": {"Content-Type": "application/json", "Date": "Tue, 02 Jan 2024 00:00:00 GMT", "X-Extra": "1"},
                "body": {"id": "u-99", "name": "Alice", "createdAt": "2024-06-01T12:00:00Z", "extra": true}
            }
        }));
        assert!(verifier().verify(&live, &fixture()).is_ok());
    }

    #[test]
    fn test_status_mismatch() {
        let mut live = fixture();
        live.response.status = 500;
        let err = verifier().verify(&live, &fixture()).unwrap_err();
        assert_eq!(err.kind, MismatchKind::ValueMismatch);
        assert_eq!(err.breadcrumb(), "response.status");
    }

    #[test]
    fn test_body_mismatch_is_located() {
        let mut live = fixture();
        live.response.body = Some(json!({"id": "u-1", "name": "Bob", "createdAt": "2024-01-01T00:00:00Z"}));
        let err = verifier().verify(&live, &fixture()).unwrap_err();
        assert_eq!(err.kind, MismatchKind::TextMismatch);
        assert_eq!(err.breadcrumb(), "response.body.name");
    }

    #[test]
    fn test_fixture_without_body_accepts_live_body() {
        let fixture = record(json!({"response": {"status": 204}}));
        let live = record(json!({"response": {"status": 204, "body": {"x": 1}}}));
        assert!(verifier().verify(&live, &fixture).is_ok());

        let mut strict_fixture = fixture;
        strict_fixture.options = json!({"strictMatching": true}).as_object().cloned();
        let err = verifier().verify(&live, &strict_fixture).unwrap_err();
        assert_eq!(err.kind, MismatchKind::MissingField);
        assert_eq!(err.breadcrumb(), "response.body");
    }

    #[test]
    fn test_record_options_enable_strict_body() {
        let mut live = fixture();
        live.response.body = Some(json!({"id": "u-1", "name": "Alice", "createdAt": "2024-01-01T00:00:00Z", "extra": 1}));
        assert!(verifier().verify(&live, &fixture()).is_ok());

        let mut strict_fixture = fixture();
        strict_fixture.options = json!({"strictMatching": true}).as_object().cloned();
        let err = verifier().verify(&live, &strict_fixture).unwrap_err();
        assert_eq!(err.kind, MismatchKind::MissingField);
        assert_eq!(err.breadcrumb(), "response.body.extra");
    }

    #[test]
    fn test_headers_stay_non_strict_under_strict_matching() {
        let config = EngineConfig {
            matching: crate::config::MatchSettings {
                strict_matching: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let verifier = InteractionVerifier::new(Arc::new(config));
        let mut live = fixture();
        live.response.headers.insert("x-extra".into(), json!("1"));
        assert!(verifier.verify(&live, &fixture()).is_ok());
    }

    #[test]
    fn test_verify_all() {
        let document = PactDocument {
            records: vec![fixture(), fixture()],
            ..Default::default()
        };
        let verifier = verifier();
        assert!(verifier.verify_all(&[fixture(), fixture()], &document).is_ok());

        let mut broken = fixture();
        broken.response.status = 404;
        match verifier.verify_all(&[fixture(), broken], &document) {
            Err(VerifyError::Record { index, failure }) => {
                assert_eq!(index, 1);
                assert_eq!(failure.breadcrumb(), "response.status");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(matches!(
            verifier.verify_all(&[fixture()], &document),
            Err(VerifyError::CountMismatch { actual: 1, expected: 2 })
        ));
    }
}
