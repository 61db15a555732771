//! Cache-key construction and key families.
//!
//! Keys look like `assignments:list:page=1&limit=10&status=published` and
//! `assignments:detail:64f1c0`. Every value is form-urlencoded, so the `:`,
//! `&` and `=` separators can only come from the key layout itself.

use std::fmt;

use url::form_urlencoded;

use super::ListParams;

/// A deterministic cache slot identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the resource segment of the key.
    pub fn resource(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    /// Returns true if this key addresses a list read.
    pub fn is_list(&self) -> bool {
        self.0
            .strip_prefix(self.resource())
            .is_some_and(|rest| rest.starts_with(":list:"))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns the cache key for a list read of `resource` with `params`.
pub fn list_key(resource: &str, params: &ListParams) -> QueryKey {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in params.to_pairs() {
        serializer.append_pair(&name, &value);
    }
    QueryKey(format!("{}:list:{}", resource, serializer.finish()))
}

/// Returns the cache key for a single record of `resource`.
pub fn detail_key(resource: &str, id: &str) -> QueryKey {
    let id: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
    QueryKey(format!("{}:detail:{}", resource, id))
}

/// Returns the prefix shared by every list key of `resource`.
pub fn list_prefix(resource: &str) -> String {
    format!("{}:list:", resource)
}

/// Returns the prefix shared by every detail key of `resource`.
pub fn detail_prefix(resource: &str) -> String {
    format!("{}:detail:", resource)
}

/// Returns the prefix shared by every key of `resource`.
pub fn resource_prefix(resource: &str) -> String {
    format!("{}:", resource)
}

/// Selects a family of cache keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// Exactly one key.
    Exact(QueryKey),
    /// Every key starting with the prefix.
    Prefix(String),
}

impl KeyFilter {
    /// Every list key of `resource`.
    pub fn lists(resource: &str) -> Self {
        KeyFilter::Prefix(list_prefix(resource))
    }

    /// The detail slot of one record.
    pub fn detail(resource: &str, id: &str) -> Self {
        KeyFilter::Exact(detail_key(resource, id))
    }

    /// Every detail slot of `resource`.
    pub fn details(resource: &str) -> Self {
        KeyFilter::Prefix(detail_prefix(resource))
    }

    /// Every key of `resource`.
    pub fn resource(resource: &str) -> Self {
        KeyFilter::Prefix(resource_prefix(resource))
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            KeyFilter::Exact(exact) => exact == key,
            KeyFilter::Prefix(prefix) => key.as_str().starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for KeyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFilter::Exact(key) => write!(f, "{}", key),
            KeyFilter::Prefix(prefix) => write!(f, "{}*", prefix),
        }
    }
}
