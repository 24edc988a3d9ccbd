//! The regex-rewrite stage: `/pattern/replacement/flags` expressions.

use crate::path::{resolve, KeyPath};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a rewrite expression could not be parsed.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("expression must have the form /pattern/replacement/flags")]
    MissingDelimiter,
    #[error("unknown regex flag '{0}'")]
    UnknownFlag(char),
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A parsed rewrite expression.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    regex: Regex,
    replacement: String,
    global: bool,
}

impl RewriteRule {
    /// Parse `/pattern/replacement/flags`. A `/` inside the pattern or the
    /// replacement is written `\/`. Flags: `g`, `i`, `m`, `s`.
    pub fn parse(expression: &str) -> Result<Self, RewriteError> {
        let body = expression
            .strip_prefix('/')
            .ok_or(RewriteError::MissingDelimiter)?;
        let parts = split_unescaped(body);
        let [pattern, replacement, flags] = parts.as_slice() else {
            return Err(RewriteError::MissingDelimiter);
        };

        let mut builder = RegexBuilder::new(pattern);
        let mut global = false;
        for flag in flags.chars() {
            match flag {
                'g' => global = true,
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                other => return Err(RewriteError::UnknownFlag(other)),
            }
        }

        Ok(Self {
            regex: builder.build()?,
            replacement: convert_replacement(replacement),
            global,
        })
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Rewrite `text`: every occurrence with `g`, otherwise the first.
    pub fn rewrite(&self, text: &str) -> String {
        if self.global {
            self.regex.replace_all(text, self.replacement.as_str()).into_owned()
        } else {
            self.regex.replace(text, self.replacement.as_str()).into_owned()
        }
    }
}

/// Split on `/` not preceded by a backslash, unescaping `\/`.
fn split_unescaped(body: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'/') => {
                chars.next();
                if let Some(current) = parts.last_mut() {
                    current.push('/');
                }
            }
            '/' => parts.push(String::new()),
            other => {
                if let Some(current) = parts.last_mut() {
                    current.push(other);
                }
            }
        }
    }
    parts
}

/// Convert `$1`, `$&` and `$<name>` references to the `${..}` form.
fn convert_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some('&') => {
                chars.next();
                out.push_str("${0}");
            }
            Some(digit) if digit.is_ascii_digit() => {
                let mut number = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    number.push(d);
                    chars.next();
                }
                out.push_str(&format!("${{{number}}}"));
            }
            Some('<') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '>' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if closed {
                    out.push_str(&format!("${{{name}}}"));
                } else {
                    out.push_str("$$<");
                    out.push_str(&name);
                }
            }
            // A lone `$` is literal
            _ => out.push_str("$$"),
        }
    }
    out
}

/// Check an expression without applying it.
pub fn validate_expression(expression: &str) -> Result<(), RewriteError> {
    RewriteRule::parse(expression).map(|_| ())
}

/// Apply the expressions for `path` in order to every string it resolves to.
pub(crate) fn apply(record: &mut Value, path: &KeyPath, expressions: &[String], ignore_case: bool) {
    let rules: Vec<RewriteRule> = expressions
        .iter()
        .filter_map(|expression| match RewriteRule::parse(expression) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!("Skipping malformed regex expression '{}' for {}: {}", expression, path, e);
                None
            }
        })
        .collect();
    if rules.is_empty() {
        return;
    }

    for location in resolve(record, path, ignore_case) {
        match location.get_mut(record) {
            Some(Value::String(text)) => {
                for rule in &rules {
                    *text = rule.rewrite(text);
                }
            }
            Some(_) => debug!("Skipping regex rewrite of non-string value at {}", location),
            None => {}
        }
    }
}
