//! Fixture documents.

use super::record::InteractionRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recorded interactions plus the metadata they were recorded under.
///
/// Record order is replay order and is preserved by every transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PactDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub info: Metadata,
    pub records: Vec<InteractionRecord>,
}

impl PactDocument {
    pub fn new(info: Metadata) -> Self {
        Self {
            id: None,
            info,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Who recorded a document against what, and under which settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Verify this document with strict matching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_matching: Option<bool>,
    /// Base URL the interactions were recorded against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    /// Keys this model does not know about, kept as they are
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
