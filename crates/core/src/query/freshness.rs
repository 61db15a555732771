//! Freshness arithmetic for cached entries.
//!
//! An entry is fresh while its age is within the freshness window and it has
//! not been invalidated. It stays servable as a stale fallback until the
//! garbage-collection window passes, after which it may be evicted.

use std::time::Duration;

/// How long fetched data stays fresh, and how long it is kept at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTiming {
    /// Freshness window.
    pub stale_time: Duration,
    /// Garbage-collection window.
    pub gc_time: Duration,
}

impl QueryTiming {
    pub const fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            stale_time,
            gc_time,
        }
    }

    /// Defaults for list reads: 5 minutes fresh, kept for 10.
    pub const fn list() -> Self {
        Self::new(Duration::from_secs(5 * 60), Duration::from_secs(10 * 60))
    }

    /// Defaults for single-record reads: 10 minutes fresh, kept for 30.
    pub const fn detail() -> Self {
        Self::new(Duration::from_secs(10 * 60), Duration::from_secs(30 * 60))
    }
}

impl Default for QueryTiming {
    fn default() -> Self {
        Self::list()
    }
}

/// State of a cached entry at a given age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served without a network call.
    Fresh,
    /// Servable as a fallback, but the next read re-fetches.
    Stale,
    /// Past the garbage-collection window.
    Expired,
}

/// Classifies an entry of the given `age`.
///
/// The boundaries are exclusive: an entry is stale only once
/// `age > stale_time`, and expired only once `age > gc_time`.
pub fn freshness(age: Duration, invalidated: bool, timing: &QueryTiming) -> Freshness {
    if age > timing.gc_time {
        Freshness::Expired
    } else if invalidated || age > timing.stale_time {
        Freshness::Stale
    } else {
        Freshness::Fresh
    }
}
