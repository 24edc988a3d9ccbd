//! Reference expansion and parameter substitution for fixture documents.
//!
//! Resolution runs in three stages over a deep copy of the input:
//!
//! 1. **Pre-process** - every `$ref` carrying a query string
//!    (`#/definitions/user?name=Alice&age=Int(30)`) is recorded with its typed
//!    parameters and rewritten to its base reference.
//! 2. **Dereference** - internal `#/...` pointers and external files (relative
//!    or absolute paths, `file://` URIs, JSON or YAML) are expanded in place.
//!    Circular references are left as `$ref` markers.
//! 3. **Post-process** - each recorded reference's expanded value has its
//!    `{{name}}` placeholders substituted with the recorded parameters.
//!
//! A document with a top-level `records` key comes back trimmed to `id`,
//! `info` and `records`.
//!
//! # Example
//!
//! ```
//! use pact_engine::resolver::ReferenceResolver;
//! use serde_json::json;
//!
//! let fixture = json!({
//!     "definitions": {"greet": "Hello {{name}}!"},
//!     "message": {"$ref": "#/definitions/greet?name=World"}
//! });
//! let resolved = ReferenceResolver::new().resolve(&fixture).unwrap();
//! assert_eq!(resolved["message"], json!("Hello World!"));
//! ```

mod deref;
mod error;
mod params;
mod template;

pub use deref::{FsLoader, SourceLoader};
pub use error::{ResolveError, ResolveResult};
pub use params::{parse_query, ParamValue, ParameterizedRef, REF_KEY};
pub use template::substitute;

use crate::config::ResolverSettings;
use crate::model::PactDocument;
use deref::Dereferencer;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Keys kept on a resolved fixture document.
const ENVELOPE_KEYS: [&str; 3] = ["id", "info", "records"];

/// Expands `$ref` links and parameter placeholders in fixture documents.
#[derive(Clone)]
pub struct ReferenceResolver {
    loader: Arc<dyn SourceLoader>,
    base_dir: PathBuf,
}

impl std::fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceResolver {
    /// A resolver reading external files from disk, relative to the current
    /// directory.
    pub fn new() -> Self {
        Self {
            loader: Arc::new(FsLoader),
            base_dir: PathBuf::from("."),
        }
    }

    pub fn from_settings(settings: &ResolverSettings) -> Self {
        match &settings.base_dir {
            Some(dir) => Self::new().with_base_dir(dir),
            None => Self::new(),
        }
    }

    /// Directory relative external references are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = base_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn SourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve every reference in `document`.
    ///
    /// Values other than objects and arrays are returned unchanged.
    pub fn resolve(&self, document: &Value) -> ResolveResult<Value> {
        if !document.is_object() && !document.is_array() {
            return Ok(document.clone());
        }

        let mut working = document.clone();
        let parameterized = params::collect_parameterized(&mut working);
        debug!("Found {} parameterized references", parameterized.len());

        let mut expanded = Dereferencer::new(self.loader.as_ref(), self.base_dir.clone())
            .expand_root(working)?;

        for reference in &parameterized {
            let Some(value) = reference.container.get(&expanded) else {
                debug!(
                    "Parameterized reference '{}' no longer resolves at {}",
                    reference.original, reference.container
                );
                continue;
            };
            let substituted = template::substitute(value, &reference.params);
            reference.container.set(&mut expanded, substituted);
        }

        Ok(trim_envelope(expanded))
    }

    /// Resolve `document` and read it as a [`PactDocument`].
    pub fn resolve_document(&self, document: &Value) -> ResolveResult<PactDocument> {
        let resolved = self.resolve(document)?;
        Ok(serde_json::from_value(resolved)?)
    }
}

fn trim_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("records") => {
            let mut trimmed = Map::new();
            for key in ENVELOPE_KEYS {
                if let Some(kept) = map.remove(key) {
                    trimmed.insert(key.to_string(), kept);
                }
            }
            Value::Object(trimmed)
        }
        other => other,
    }
}
