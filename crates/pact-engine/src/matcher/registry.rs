//! Field name to property matcher registries.

use super::property::{
    DateTimeMatcher, IgnoreMatcher, PropertyMatcher, RegistryMatcher, SameTypeMatcher,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Response headers whose values change on every call.
const VOLATILE_HEADERS: &[&str] = &[
    "date",
    "expires",
    "last-modified",
    "etag",
    "age",
    "x-request-id",
    "x-correlation-id",
    "set-cookie",
];

const BODY_IDENTIFIERS: &[&str] = &["id", "uuid", "tenant", "tenantId"];

const BODY_TIMESTAMPS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "modifiedAt",
    "created",
    "modified",
    "lastModified",
    "timestamp",
];

const BODY_IGNORED: &[&str] = &["self", "password"];

/// Maps field names to the matcher that overrides default equality for them.
///
/// Registries compose by construction: the
/// [`standard`](PropertyMatcherRegistry::standard) registry routes its
/// `headers` field to [`PropertyMatcherRegistry::headers`] and its `body`
/// field to [`PropertyMatcherRegistry::body`], so header rules never leak
/// into bodies.
#[derive(Clone)]
pub struct PropertyMatcherRegistry {
    matchers: HashMap<String, Arc<dyn PropertyMatcher>>,
}

impl PropertyMatcherRegistry {
    /// A registry with no rules; every field uses default equality.
    pub fn empty() -> Self {
        Self {
            matchers: HashMap::new(),
        }
    }

    /// The default registry for a whole response: `headers` are compared
    /// under [`PropertyMatcherRegistry::headers`] and `body` under
    /// [`PropertyMatcherRegistry::body`].
    pub fn standard() -> Self {
        Self::empty()
            .with("headers", Arc::new(RegistryMatcher::new(Arc::new(Self::headers()))))
            .with("body", Arc::new(RegistryMatcher::new(Arc::new(Self::body()))))
    }

    /// Registry for header maps: volatile headers are ignored.
    pub fn headers() -> Self {
        let mut registry = Self::empty();
        for field in VOLATILE_HEADERS {
            registry.insert(*field, Arc::new(IgnoreMatcher));
        }
        registry
    }

    /// Registry for response bodies: identifiers only need the same type,
    /// timestamps must be date-times, self-links and passwords are ignored.
    ///
    /// Identifiers use [`SameTypeMatcher`] because fixtures hold both numeric
    /// and string ids. Register [`NumericIdMatcher`] for fields known to carry
    /// digit-only string ids:
    ///
    /// ```
    /// use pact_engine::matcher::{NumericIdMatcher, PropertyMatcherRegistry};
    /// use std::sync::Arc;
    ///
    /// let registry = PropertyMatcherRegistry::body().with("accountId", Arc::new(NumericIdMatcher));
    /// assert!(registry.get("accountId", false).is_some());
    /// ```
    ///
    /// [`NumericIdMatcher`]: super::NumericIdMatcher
    pub fn body() -> Self {
        let mut registry = Self::empty();
        for field in BODY_IDENTIFIERS {
            registry.insert(*field, Arc::new(SameTypeMatcher));
        }
        for field in BODY_TIMESTAMPS {
            registry.insert(*field, Arc::new(DateTimeMatcher));
        }
        for field in BODY_IGNORED {
            registry.insert(*field, Arc::new(IgnoreMatcher));
        }
        registry
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, matcher: Arc<dyn PropertyMatcher>) -> Self {
        self.insert(field, matcher);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, matcher: Arc<dyn PropertyMatcher>) {
        self.matchers.insert(field.into(), matcher);
    }

    pub fn remove(&mut self, field: &str) -> Option<Arc<dyn PropertyMatcher>> {
        self.matchers.remove(field)
    }

    /// Find the matcher for `field`, preferring an exact-case entry.
    pub fn get(&self, field: &str, ignore_case: bool) -> Option<&Arc<dyn PropertyMatcher>> {
        if let Some(matcher) = self.matchers.get(field) {
            return Some(matcher);
        }
        if !ignore_case {
            return None;
        }
        self.matchers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, matcher)| matcher)
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Registered field names, sorted.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.matchers.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }
}

impl Default for PropertyMatcherRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for PropertyMatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMatcherRegistry")
            .field("fields", &self.fields())
            .finish()
    }
}
