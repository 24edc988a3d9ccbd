//! Contract-fixture engine for recorded HTTP interactions.
//!
//! The engine records interactions, normalizes them for storage, re-hydrates
//! parameterized fixture templates and verifies that a live interaction still
//! conforms to a recorded one. It performs no network I/O; collaborators hand
//! it records and fixture documents as JSON values or typed models.
//!
//! Typical flow: a fixture document is expanded by the
//! [`ReferenceResolver`], normalized by the [`Preprocessor`], and a live
//! interaction is then checked against it by the [`InteractionVerifier`],
//! which drives the structural [`Matcher`](matcher::Matcher).

// ===== Core components =====
pub mod matcher;
pub mod path;
pub mod preprocess;
pub mod resolver;

// ===== Records, configuration and glue =====
pub mod config;
pub mod model;
pub mod recording;
pub mod verify;

// Don't export internal modules
mod auth;

pub use config::EngineConfig;
pub use matcher::{MatchFailure, MatchOptions, Matcher, MismatchKind, PropertyMatcherRegistry};
pub use model::{InteractionRecord, Metadata, PactDocument};
pub use preprocess::{PreprocessOptions, Preprocessor};
pub use recording::PactRecorder;
pub use resolver::{ReferenceResolver, ResolveError};
pub use verify::{InteractionVerifier, VerifyError};
