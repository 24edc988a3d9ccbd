//! Preprocessor options and their layered resolution.

use crate::path::KeyPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mask written over redacted values unless configured otherwise.
pub const DEFAULT_OBFUSCATION_PATTERN: &str = "****";

/// Field-level transforms applied to a record.
///
/// Every field is optional. Options are resolved per call by layering the
/// call-level options over the instance defaults over the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessOptions {
    /// Paths whose leaves are deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,

    /// Paths whose leaves are replaced by the obfuscation pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfuscate: Option<Vec<String>>,

    /// Allow-list of what to keep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick: Option<PickSpec>,

    /// `/pattern/replacement/flags` rewrites per path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_replace: Option<BTreeMap<String, Patterns>>,

    /// Mask for redacted values (default: `****`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfuscation_pattern: Option<String>,

    /// Resolve paths case-insensitively (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_case: Option<bool>,
}

/// Allow-list for the pick stage.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PickSpec {
    /// Top-level keys to keep
    Keys(Vec<String>),
    /// Parent path to the child keys kept under it; `""` is the root
    Paths(BTreeMap<String, Vec<String>>),
}

/// One rewrite expression or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Patterns::One(pattern) => std::slice::from_ref(pattern),
            Patterns::Many(patterns) => patterns,
        }
    }
}

impl PreprocessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn obfuscate<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.obfuscate = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn pick(mut self, pick: PickSpec) -> Self {
        self.pick = Some(pick);
        self
    }

    /// Append a rewrite expression for `path`.
    pub fn regex_replace(mut self, path: impl Into<String>, expression: impl Into<String>) -> Self {
        let rules = self.regex_replace.get_or_insert_with(BTreeMap::new);
        let path = path.into();
        let expression = expression.into();
        let merged = match rules.remove(&path) {
            None => Patterns::One(expression),
            Some(Patterns::One(first)) => Patterns::Many(vec![first, expression]),
            Some(Patterns::Many(mut all)) => {
                all.push(expression);
                Patterns::Many(all)
            }
        };
        rules.insert(path, merged);
        self
    }

    pub fn obfuscation_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.obfuscation_pattern = Some(pattern.into());
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = Some(ignore_case);
        self
    }

    /// Layer `self` over `base`: every field set here wins.
    pub fn merged_over(&self, base: &PreprocessOptions) -> PreprocessOptions {
        PreprocessOptions {
            ignore: self.ignore.clone().or_else(|| base.ignore.clone()),
            obfuscate: self.obfuscate.clone().or_else(|| base.obfuscate.clone()),
            pick: self.pick.clone().or_else(|| base.pick.clone()),
            regex_replace: self
                .regex_replace
                .clone()
                .or_else(|| base.regex_replace.clone()),
            obfuscation_pattern: self
                .obfuscation_pattern
                .clone()
                .or_else(|| base.obfuscation_pattern.clone()),
            ignore_case: self.ignore_case.or(base.ignore_case),
        }
    }

    /// Fill in the built-in defaults and parse every path.
    pub(crate) fn effective(&self) -> EffectiveOptions {
        let parse_all = |paths: &Option<Vec<String>>| -> Vec<KeyPath> {
            paths
                .iter()
                .flatten()
                .map(|path| KeyPath::parse(path))
                .collect()
        };

        EffectiveOptions {
            ignore: parse_all(&self.ignore),
            obfuscate: parse_all(&self.obfuscate),
            pick: self.pick.clone(),
            regex_replace: self
                .regex_replace
                .iter()
                .flatten()
                .map(|(path, patterns)| (KeyPath::parse(path), patterns.as_slice().to_vec()))
                .collect(),
            mask: self
                .obfuscation_pattern
                .clone()
                .unwrap_or_else(|| DEFAULT_OBFUSCATION_PATTERN.to_string()),
            ignore_case: self.ignore_case.unwrap_or(false),
        }
    }

    /// Whether no transform is configured.
    pub fn is_noop(&self) -> bool {
        self.ignore.as_ref().map_or(true, Vec::is_empty)
            && self.obfuscate.as_ref().map_or(true, Vec::is_empty)
            && self.pick.is_none()
            && self.regex_replace.as_ref().map_or(true, BTreeMap::is_empty)
    }
}

/// Fully resolved options for one preprocessing call.
#[derive(Debug, Clone)]
pub(crate) struct EffectiveOptions {
    pub ignore: Vec<KeyPath>,
    pub obfuscate: Vec<KeyPath>,
    pub pick: Option<PickSpec>,
    pub regex_replace: Vec<(KeyPath, Vec<String>)>,
    pub mask: String,
    pub ignore_case: bool,
}
