//! Resolver errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("reference '{reference}' points to nothing")]
    MissingPointer { reference: String },

    #[error("reference '{reference}' uses an unsupported scheme")]
    UnsupportedScheme { reference: String },

    #[error("resolved value is not a valid fixture document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
