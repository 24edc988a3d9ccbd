//! Options that modify matching behavior.

use super::diagnostics::{Conflict, DiagnosticsSink};
use super::failure::{MatchFailure, MismatchKind};
use super::schema::SchemaValidator;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Options threaded through a recursive match.
///
/// A fresh value is created per top-level call; recursion extends
/// `parents` through [`MatchOptions::child`] and never shrinks it.
#[derive(Clone)]
pub struct MatchOptions {
    /// The actual side drives key iteration; extra actual fields fail
    pub strict_matching: bool,
    /// Field-name lookups (including the property matcher registry) ignore case
    pub ignore_case: bool,
    /// Compare a literal field even when a schema marker covers it
    pub match_schema_and_object: bool,
    /// Compare arrays of primitives as unordered multisets (default: true)
    pub ignore_primitive_array_order: bool,
    /// Breadcrumb of the current position
    pub parents: Vec<String>,
    pub schema_validator: Option<Arc<dyn SchemaValidator>>,
    pub diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            strict_matching: false,
            ignore_case: false,
            match_schema_and_object: false,
            ignore_primitive_array_order: true,
            parents: Vec::new(),
            schema_validator: None,
            diagnostics: None,
        }
    }
}

impl fmt::Debug for MatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchOptions")
            .field("strict_matching", &self.strict_matching)
            .field("ignore_case", &self.ignore_case)
            .field("match_schema_and_object", &self.match_schema_and_object)
            .field("ignore_primitive_array_order", &self.ignore_primitive_array_order)
            .field("parents", &self.parents)
            .field("schema_validator", &self.schema_validator.is_some())
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_matching = strict;
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn match_schema_and_object(mut self, enabled: bool) -> Self {
        self.match_schema_and_object = enabled;
        self
    }

    pub fn ignore_primitive_array_order(mut self, enabled: bool) -> Self {
        self.ignore_primitive_array_order = enabled;
        self
    }

    /// Start the breadcrumb at `parents` instead of the root.
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = Some(validator);
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Options for a child position, one breadcrumb segment deeper.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.parents.push(segment.into());
        child
    }

    pub fn at_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Build a failure located at the current breadcrumb, reporting the
    /// conflicting values to the diagnostics sink first.
    pub fn fail(
        &self,
        kind: MismatchKind,
        message: impl Into<String>,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> MatchFailure {
        self.report(kind, &self.parents, actual, expected);
        MatchFailure::at(kind, message, &self.parents)
    }

    /// Report a conflict without building a failure. Used when a failure
    /// produced elsewhere is located here.
    pub fn report(
        &self,
        kind: MismatchKind,
        path: &[String],
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) {
        if let Some(sink) = &self.diagnostics {
            sink.conflict(Conflict {
                kind,
                path: path.to_vec(),
                actual: actual.cloned(),
                expected: expected.cloned(),
            });
        }
    }
}
