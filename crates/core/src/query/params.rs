//! Query parameters for list reads.
//!
//! `ListParams` is the value type a list query is issued with. The same
//! ordered pairs it produces are used both for the HTTP query string and
//! for the cache key, so what is cached is always what was requested.

use std::collections::BTreeMap;

/// Page requested when the caller does not say otherwise.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size requested when the caller does not say otherwise.
pub const DEFAULT_LIMIT: u32 = 10;

/// Parameter names owned by [`ListParams`] itself. Filters with these names
/// are ignored.
pub const RESERVED_PARAMS: [&str; 3] = ["page", "limit", "search"];

/// A set of string-valued filters, ordered by name.
///
/// Empty values are never stored: inserting `""` (or whitespace) removes the
/// filter, which keeps "absent" and "empty" indistinguishable in both the
/// request and the cache key. Names in [`RESERVED_PARAMS`] are never stored
/// either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a filter value. Blank values remove the filter instead; reserved
    /// names are dropped.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if RESERVED_PARAMS.contains(&name.as_str()) {
            return;
        }
        if value.trim().is_empty() {
            self.0.remove(&name);
        } else {
            self.0.insert(name, value);
        }
    }

    /// Builder form of [`Filters::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets the filter only when `value` is present.
    pub fn with_opt(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates filters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges another set into this one; `other` wins on conflicts.
    pub fn extend(&mut self, other: Filters) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (name, value) in iter {
            filters.insert(name, value);
        }
        filters
    }
}

/// A resource-specific filter struct that can be flattened into [`Filters`].
pub trait FilterSet {
    fn to_filters(&self) -> Filters;
}

impl FilterSet for Filters {
    fn to_filters(&self) -> Filters {
        self.clone()
    }
}

/// Parameters of a list read: `{page, limit, search, filters}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub filters: Filters,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            filters: Filters::new(),
        }
    }
}

impl ListParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    /// Sets the search term. Blank terms clear it.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    /// Adds every filter of a typed filter set.
    pub fn with_filters(mut self, filters: &impl FilterSet) -> Self {
        self.filters.extend(filters.to_filters());
        self
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name, value);
        self
    }

    /// Ordered request pairs: `page`, `limit`, `search` (if present), then
    /// every filter in name order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        pairs
    }
}
