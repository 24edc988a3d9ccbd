//! Fixture documents and interaction records.
//!
//! # Module Structure
//!
//! - `document` - [`PactDocument`] and its [`Metadata`]
//! - `record` - [`InteractionRecord`] and its parts

mod document;
mod record;

pub use document::{Metadata, PactDocument};
pub use record::{AuthInfo, InteractionRecord, RecordedRequest, RecordedResponse};
