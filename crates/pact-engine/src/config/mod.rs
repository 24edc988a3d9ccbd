//! Engine configuration.
//!
//! # Example
//!
//! ```yaml
//! matching:
//!   strictMatching: false
//!   ignoreCase: true
//! preprocess:
//!   ignore:
//!     - response.headers.date
//!   obfuscate:
//!     - request.headers.Authorization
//!   obfuscationPattern: "[redacted]"
//! resolver:
//!   baseDir: ./fixtures
//! ```

mod matching;
mod resolver;

pub use matching::MatchSettings;
pub use resolver::ResolverSettings;

use crate::matcher::{DiagnosticsSink, MatchOptions, SchemaValidator};
use crate::preprocess::{validate_expression, PreprocessOptions, Preprocessor};
use crate::resolver::ReferenceResolver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Configuration shared by every engine component.
///
/// Owned by the caller and usually wrapped in an `Arc`. The schema validator
/// and diagnostics sink cannot come from a file; attach them with
/// [`EngineConfig::with_schema_validator`] and
/// [`EngineConfig::with_diagnostics`].
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub matching: MatchSettings,

    /// Instance-level preprocessing options
    #[serde(default)]
    pub preprocess: PreprocessOptions,

    #[serde(default)]
    pub resolver: ResolverSettings,

    #[serde(skip)]
    pub schema_validator: Option<Arc<dyn SchemaValidator>>,

    #[serde(skip)]
    pub diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("matching", &self.matching)
            .field("preprocess", &self.preprocess)
            .field("resolver", &self.resolver)
            .field("schema_validator", &self.schema_validator.is_some())
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl EngineConfig {
    /// Load a YAML (or JSON) configuration file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.preprocess.obfuscation_pattern.as_deref() == Some("") {
            anyhow::bail!("'preprocess.obfuscationPattern' must not be empty");
        }

        if let Some(dir) = &self.resolver.base_dir {
            if !dir.is_dir() {
                anyhow::bail!(
                    "'resolver.baseDir' does not exist or is not a directory: {}",
                    dir.display()
                );
            }
        }

        // Malformed expressions are skipped at runtime, so only warn
        for (path, patterns) in self.preprocess.regex_replace.iter().flatten() {
            for expression in patterns.as_slice() {
                if let Err(e) = validate_expression(expression) {
                    warn!(
                        "Malformed regexReplace expression '{}' for '{}' will be skipped: {}",
                        expression, path, e
                    );
                }
            }
        }

        Ok(())
    }

    pub fn with_schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = Some(validator);
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Fresh top-level match options carrying the configured defaults.
    pub fn match_options(&self) -> MatchOptions {
        let mut options = MatchOptions::new()
            .strict(self.matching.strict_matching)
            .ignore_case(self.matching.ignore_case)
            .match_schema_and_object(self.matching.match_schema_and_object)
            .ignore_primitive_array_order(self.matching.ignore_primitive_array_order);
        options.schema_validator = self.schema_validator.clone();
        options.diagnostics = self.diagnostics.clone();
        options
    }

    pub fn preprocessor(&self) -> Preprocessor {
        Preprocessor::new(self.preprocess.clone())
    }

    pub fn resolver(&self) -> ReferenceResolver {
        ReferenceResolver::from_settings(&self.resolver)
    }
}
