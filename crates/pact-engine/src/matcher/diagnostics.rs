//! Sinks that receive the conflicting values behind every match failure.

use super::failure::{render_breadcrumb, MismatchKind};
use parking_lot::Mutex;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use tracing::debug;

/// The two sub-values that disagreed, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub kind: MismatchKind,
    pub path: Vec<String>,
    pub actual: Option<Value>,
    pub expected: Option<Value>,
}

impl Conflict {
    pub fn breadcrumb(&self) -> String {
        render_breadcrumb(&self.path)
    }

    /// Line diff of the pretty-printed values (`-` expected, `+` actual).
    pub fn diff(&self) -> String {
        render_diff(self.expected.as_ref(), self.actual.as_ref())
    }
}

/// Receives a [`Conflict`] for every failure the matcher produces.
pub trait DiagnosticsSink: Send + Sync {
    fn conflict(&self, conflict: Conflict);
}

/// Keeps every reported conflict in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    conflicts: Mutex<Vec<Conflict>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.conflicts.lock().clone()
    }

    /// Drain the collected conflicts.
    pub fn take(&self) -> Vec<Conflict> {
        std::mem::take(&mut *self.conflicts.lock())
    }

    pub fn len(&self) -> usize {
        self.conflicts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.lock().is_empty()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn conflict(&self, conflict: Conflict) {
        self.conflicts.lock().push(conflict);
    }
}

/// Logs each conflict at debug level with a line diff.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn conflict(&self, conflict: Conflict) {
        debug!(
            kind = %conflict.kind,
            path = %conflict.breadcrumb(),
            "Match conflict:\n{}",
            conflict.diff()
        );
    }
}

fn pretty(value: Option<&Value>) -> String {
    match value {
        Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        None => "<missing>".to_string(),
    }
}

/// Line diff between two optional values.
pub fn render_diff(expected: Option<&Value>, actual: Option<&Value>) -> String {
    let old = pretty(expected);
    let new = pretty(actual);
    let diff = TextDiff::from_lines(&old, &new);

    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        out.push(sign);
        out.push_str(change.value());
        if !change.value().ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
