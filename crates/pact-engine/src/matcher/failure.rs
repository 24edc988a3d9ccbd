//! Typed, located match failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a match failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchKind {
    TextMismatch,
    TypeMismatch,
    MissingField,
    ArrayLengthMismatch,
    ArrayElementMismatch,
    SchemaMismatch,
    ValueMismatch,
}

impl MismatchKind {
    pub fn label(self) -> &'static str {
        match self {
            MismatchKind::TextMismatch => "text-mismatch",
            MismatchKind::TypeMismatch => "type-mismatch",
            MismatchKind::MissingField => "missing-field",
            MismatchKind::ArrayLengthMismatch => "array-length-mismatch",
            MismatchKind::ArrayElementMismatch => "array-element-mismatch",
            MismatchKind::SchemaMismatch => "schema-mismatch",
            MismatchKind::ValueMismatch => "value-mismatch",
        }
    }
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A failed comparison, with the breadcrumb of the field where it happened.
///
/// Failures produced by property matchers start out unlocated; the matcher
/// attaches the current breadcrumb before returning them. A failure that is
/// already located keeps its path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message} (at {})", render_location(.path))]
pub struct MatchFailure {
    pub kind: MismatchKind,
    pub message: String,
    pub path: Option<Vec<String>>,
}

impl MatchFailure {
    /// An unlocated failure.
    pub fn new(kind: MismatchKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
        }
    }

    /// A failure located at `path`.
    pub fn at(kind: MismatchKind, message: impl Into<String>, path: &[String]) -> Self {
        Self {
            kind,
            message: message.into(),
            path: Some(path.to_vec()),
        }
    }

    pub fn is_located(&self) -> bool {
        self.path.is_some()
    }

    /// Attach `path` unless the failure already carries one.
    pub fn locate(mut self, path: &[String]) -> Self {
        if self.path.is_none() {
            self.path = Some(path.to_vec());
        }
        self
    }

    /// The location rendered as `response.body.items[2].name`.
    pub fn breadcrumb(&self) -> String {
        render_location(&self.path)
    }
}

fn render_location(path: &Option<Vec<String>>) -> String {
    match path {
        Some(segments) => render_breadcrumb(segments),
        None => "<unknown>".to_string(),
    }
}

/// Join breadcrumb segments; index segments (`[2]`) attach without a dot.
pub fn render_breadcrumb(segments: &[String]) -> String {
    if segments.is_empty() {
        return "<root>".to_string();
    }
    let mut out = String::new();
    for segment in segments {
        if !out.is_empty() && !segment.starts_with('[') {
            out.push('.');
        }
        out.push_str(segment);
    }
    out
}
