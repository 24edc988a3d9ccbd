//! In-memory recorder for interactions.

use crate::model::{InteractionRecord, Metadata, PactDocument};
use crate::preprocess::Preprocessor;
use parking_lot::RwLock;
use std::time::Instant;
use tracing::{debug, info};

/// Buffers recorded interactions in order, normalizing each one as it
/// arrives.
pub struct PactRecorder {
    id: Option<String>,
    info: Metadata,
    preprocessor: Preprocessor,
    records: RwLock<Vec<InteractionRecord>>,
}

impl PactRecorder {
    pub fn new(info: Metadata, preprocessor: Preprocessor) -> Self {
        Self {
            id: None,
            info,
            preprocessor,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn info(&self) -> &Metadata {
        &self.info
    }

    /// Normalize and append a record, returning its index.
    pub fn record(&self, mut record: InteractionRecord) -> Result<usize, serde_json::Error> {
        self.preprocessor.apply_to(&mut record, None)?;
        let mut records = self.records.write();
        records.push(record);
        let index = records.len() - 1;
        debug!("Recorded interaction {}", index);
        Ok(index)
    }

    /// Run `exchange`, store how long it took in `response.duration`, and
    /// record the interaction it returns.
    pub fn record_with_timing<F>(&self, exchange: F) -> Result<usize, serde_json::Error>
    where
        F: FnOnce() -> InteractionRecord,
    {
        let start = Instant::now();
        let mut record = exchange();
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        record.response.duration = Some(elapsed);
        self.record(record)
    }

    /// The recorded interactions as a document, in recording order.
    pub fn snapshot(&self) -> PactDocument {
        PactDocument {
            id: self.id.clone(),
            info: self.info.clone(),
            records: self.records.read().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clear all recordings
    pub fn clear(&self) {
        let mut records = self.records.write();
        let count = records.len();
        records.clear();
        info!("Cleared {} recorded interactions", count);
    }
}

impl std::fmt::Debug for PactRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PactRecorder")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("preprocessor", &self.preprocessor)
            .field("records", &self.records.read().len())
            .finish()
    }
}
