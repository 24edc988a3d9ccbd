//! Recording interactions into fixture documents.
//!
//! A [`PactRecorder`] buffers interactions in recording order, normalizing
//! each one with its [`Preprocessor`](crate::preprocess::Preprocessor) as it
//! is recorded. [`PactRecorder::snapshot`] exports the buffer as a
//! [`PactDocument`](crate::model::PactDocument); writing it somewhere is the
//! caller's job.
//!
//! # Module Structure
//!
//! - `recorder` - the recording buffer

mod recorder;

pub use recorder::PactRecorder;
