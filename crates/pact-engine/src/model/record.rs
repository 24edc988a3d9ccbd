//! One recorded interaction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request/response pair plus the context it was recorded in.
///
/// Every field deserializes leniently: records come from heterogeneous,
/// often incomplete sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionRecord {
    pub request: RecordedRequest,
    pub response: RecordedResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthInfo>,
    /// Per-record flags such as `strictMatching` and `ignoreCase`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// Identifier of an object the interaction created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_object: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl InteractionRecord {
    /// A boolean flag from `options`, if present.
    pub fn option_flag(&self, name: &str) -> Option<bool> {
        self.options.as_ref()?.get(name)?.as_bool()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Round-trip time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// Who performed the interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthInfo {
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_alias: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
