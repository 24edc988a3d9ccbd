//! Default matching behavior.

use serde::{Deserialize, Serialize};

/// Matching defaults applied to every verification.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSettings {
    /// Every actual field must exist in the fixture (default: false)
    #[serde(default)]
    pub strict_matching: bool,

    /// Field names compare case-insensitively (default: false)
    #[serde(default)]
    pub ignore_case: bool,

    /// Compare literal fields even when a `$field` schema covers them (default: false)
    #[serde(default)]
    pub match_schema_and_object: bool,

    /// Arrays of primitives compare as multisets (default: true)
    #[serde(default = "default_ignore_primitive_array_order")]
    pub ignore_primitive_array_order: bool,
}

fn default_ignore_primitive_array_order() -> bool {
    true
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            strict_matching: false,
            ignore_case: false,
            match_schema_and_object: false,
            ignore_primitive_array_order: true,
        }
    }
}
