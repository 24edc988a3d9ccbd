//! Key-path micro-language shared by the matcher and the preprocessor.
//!
//! A key path is a dotted list of segments addressing values inside a JSON tree:
//!
//! - `response.body.name` - plain object keys
//! - `items[0].id` or `items.0.id` - array indices (bracketed or bare)
//! - `headers["Set-Cookie"]` - quoted keys containing dots or brackets
//! - `body..password` - recursive descent: `password` at any depth under `body`
//!
//! When a key segment meets an array, the walk fans out over every composite
//! element of that array. Paths that cannot be resolved produce no locations;
//! callers treat that as a no-op.
//!
//! # Module Structure
//!
//! - `segment` - parsing a path string into [`Segment`]s
//! - `walk` - resolving a [`KeyPath`] into concrete [`Location`]s

mod segment;
mod walk;

pub use segment::{KeyPath, Segment};
pub use walk::{lookup_key, names_equal, resolve, Location, Step};
