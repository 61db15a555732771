//! In-memory query store with LRU eviction and per-key change events.
//!
//! Entries hold the JSON-encoded result of a read together with the moment
//! it was fetched. Freshness is derived on access from the entry's
//! [`QueryTiming`]; nothing is removed on expiry until a garbage-collection
//! sweep finds the entry expired and unobserved.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;

use campusync_core::query::{freshness, Freshness, KeyFilter, QueryKey, QueryTiming};

/// Channel capacity for store events.
const CHANNEL_CAPACITY: usize = 100;

/// Change notifications published per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    FetchStarted(QueryKey),
    Updated(QueryKey),
    Invalidated(QueryKey),
    Removed(QueryKey),
    Evicted(QueryKey),
}

/// A cached read result.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub data: Arc<Vec<u8>>,
    pub fetched_at: Instant,
    pub timing: QueryTiming,
    /// Set by invalidation; cleared by the next successful fetch.
    pub invalidated: bool,
}

impl StoredEntry {
    pub fn freshness(&self, now: Instant) -> Freshness {
        freshness(
            now.saturating_duration_since(self.fetched_at),
            self.invalidated,
            &self.timing,
        )
    }
}

/// Result of a read-side lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Fresh(Arc<Vec<u8>>),
    Stale(Arc<Vec<u8>>),
    Missing,
}

#[derive(Debug)]
struct StoreInner {
    entries: LruCache<QueryKey, StoredEntry>,
    channels: HashMap<QueryKey, broadcast::Sender<StoreEvent>>,
}

impl StoreInner {
    fn publish(&self, event: StoreEvent) {
        let key = match &event {
            StoreEvent::FetchStarted(key)
            | StoreEvent::Updated(key)
            | StoreEvent::Invalidated(key)
            | StoreEvent::Removed(key)
            | StoreEvent::Evicted(key) => key,
        };
        if let Some(sender) = self.channels.get(key) {
            // No receivers is fine: nobody is watching this key.
            let _ = sender.send(event.clone());
        }
    }

    fn is_observed(&self, key: &QueryKey) -> bool {
        self.channels
            .get(key)
            .is_some_and(|sender| sender.receiver_count() > 0)
    }

    fn matching_keys(&self, filter: &KeyFilter) -> Vec<QueryKey> {
        self.entries
            .iter()
            .filter(|(key, _)| filter.matches(key))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Thread-safe query store using `Arc<RwLock<..>>` for concurrent access.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Debug, Clone)]
pub struct QueryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl QueryStore {
    /// Creates a store holding at most `max_entries` entries (at least one).
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                entries: LruCache::new(capacity),
                channels: HashMap::new(),
            })),
        }
    }

    /// Classifies the entry under `key`, marking it recently used.
    ///
    /// Expired entries are reported as [`Lookup::Missing`].
    pub async fn lookup(&self, key: &QueryKey) -> Lookup {
        let mut inner = self.inner.write().await;
        let now = Instant::now();
        match inner.entries.get(key) {
            Some(entry) => match entry.freshness(now) {
                Freshness::Fresh => Lookup::Fresh(Arc::clone(&entry.data)),
                Freshness::Stale => Lookup::Stale(Arc::clone(&entry.data)),
                Freshness::Expired => Lookup::Missing,
            },
            None => Lookup::Missing,
        }
    }

    /// Returns a copy of the entry without touching its recency.
    pub async fn get(&self, key: &QueryKey) -> Option<StoredEntry> {
        self.inner.read().await.entries.peek(key).cloned()
    }

    pub async fn fetched_at(&self, key: &QueryKey) -> Option<Instant> {
        self.get(key).await.map(|entry| entry.fetched_at)
    }

    /// Stores a freshly fetched result, replacing any previous entry.
    pub async fn set(&self, key: QueryKey, data: Arc<Vec<u8>>, timing: QueryTiming) {
        let mut inner = self.inner.write().await;
        let entry = StoredEntry {
            data,
            fetched_at: Instant::now(),
            timing,
            invalidated: false,
        };
        if let Some((evicted, _)) = inner.entries.push(key.clone(), entry) {
            if evicted != key {
                tracing::debug!(key = %evicted, "Evicted least recently used entry");
                inner.publish(StoreEvent::Evicted(evicted));
            }
        }
        inner.publish(StoreEvent::Updated(key));
    }

    /// Marks every matching entry stale. Returns how many were marked.
    pub async fn invalidate(&self, filter: &KeyFilter) -> usize {
        let mut inner = self.inner.write().await;
        let keys = inner.matching_keys(filter);
        for key in &keys {
            if let Some(entry) = inner.entries.peek_mut(key) {
                entry.invalidated = true;
            }
        }
        for key in &keys {
            inner.publish(StoreEvent::Invalidated(key.clone()));
        }
        tracing::debug!(filter = %filter, count = keys.len(), "Invalidated entries");
        keys.len()
    }

    /// Drops every matching entry. Returns how many were dropped.
    pub async fn remove(&self, filter: &KeyFilter) -> usize {
        let mut inner = self.inner.write().await;
        let keys = inner.matching_keys(filter);
        for key in &keys {
            inner.entries.pop(key);
            inner.publish(StoreEvent::Removed(key.clone()));
        }
        tracing::debug!(filter = %filter, count = keys.len(), "Removed entries");
        keys.len()
    }

    /// Subscribes to events for `key`.
    ///
    /// While a receiver is alive the entry is never garbage collected.
    pub async fn subscribe(&self, key: &QueryKey) -> broadcast::Receiver<StoreEvent> {
        let mut inner = self.inner.write().await;
        inner
            .channels
            .entry(key.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub(crate) async fn notify_fetch_started(&self, key: &QueryKey) {
        self.inner
            .read()
            .await
            .publish(StoreEvent::FetchStarted(key.clone()));
    }

    /// Drops expired entries that nobody observes, and channels nobody
    /// listens to. Returns the number of entries dropped.
    pub async fn collect_garbage(&self) -> usize {
        let mut inner = self.inner.write().await;
        let now = Instant::now();

        let expired: Vec<QueryKey> = inner
            .entries
            .iter()
            .filter(|(key, entry)| {
                entry.freshness(now) == Freshness::Expired && !inner.is_observed(key)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.entries.pop(key);
        }
        inner
            .channels
            .retain(|_, sender| sender.receiver_count() > 0);

        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "Collected expired entries");
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Current keys, most recently used first.
    pub async fn keys(&self) -> Vec<QueryKey> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Drops every entry, publishing [`StoreEvent::Removed`] for each.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        let keys: Vec<QueryKey> = inner.entries.iter().map(|(key, _)| key.clone()).collect();
        inner.entries.clear();
        for key in keys {
            inner.publish(StoreEvent::Removed(key));
        }
    }
}

impl Default for QueryStore {
    fn default() -> Self {
        Self::new(1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusync_core::query::{detail_key, list_key, ListParams};
    use std::time::Duration;

    fn data(value: &str) -> Arc<Vec<u8>> {
        Arc::new(value.as_bytes().to_vec())
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_and_lookup_fresh() {
        let store = QueryStore::new(10);
        let key = detail_key("assignments", "1");

        store.set(key.clone(), data("a"), QueryTiming::detail()).await;

        assert_eq!(store.lookup(&key).await, Lookup::Fresh(data("a")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_missing() {
        let store = QueryStore::new(10);
        assert_eq!(
            store.lookup(&detail_key("assignments", "1")).await,
            Lookup::Missing
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_goes_stale_then_expires() {
        let store = QueryStore::new(10);
        let key = list_key("courses", &ListParams::default());
        store.set(key.clone(), data("a"), QueryTiming::list()).await;

        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        assert_eq!(store.lookup(&key).await, Lookup::Fresh(data("a")));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.lookup(&key).await, Lookup::Stale(data("a")));

        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        assert_eq!(store.lookup(&key).await, Lookup::Missing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_prefix_marks_stale() {
        let store = QueryStore::new(10);
        let first = list_key("courses", &ListParams::new(1, 10));
        let second = list_key("courses", &ListParams::new(2, 10));
        let detail = detail_key("courses", "1");
        for key in [&first, &second, &detail] {
            store.set(key.clone(), data("a"), QueryTiming::list()).await;
        }

        let count = store.invalidate(&KeyFilter::lists("courses")).await;

        assert_eq!(count, 2);
        assert_eq!(store.lookup(&first).await, Lookup::Stale(data("a")));
        assert_eq!(store.lookup(&second).await, Lookup::Stale(data("a")));
        assert_eq!(store.lookup(&detail).await, Lookup::Fresh(data("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_keeps_fetched_at() {
        let store = QueryStore::new(10);
        let key = detail_key("courses", "1");
        store.set(key.clone(), data("a"), QueryTiming::detail()).await;
        let fetched_at = store.fetched_at(&key).await;

        tokio::time::advance(Duration::from_secs(3)).await;
        store.invalidate(&KeyFilter::Exact(key.clone())).await;

        assert_eq!(store.fetched_at(&key).await, fetched_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_clears_invalidation() {
        let store = QueryStore::new(10);
        let key = detail_key("courses", "1");
        store.set(key.clone(), data("a"), QueryTiming::detail()).await;
        store.invalidate(&KeyFilter::Exact(key.clone())).await;

        store.set(key.clone(), data("b"), QueryTiming::detail()).await;

        assert_eq!(store.lookup(&key).await, Lookup::Fresh(data("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove() {
        let store = QueryStore::new(10);
        let key = detail_key("users", "7");
        store.set(key.clone(), data("a"), QueryTiming::detail()).await;

        assert_eq!(store.remove(&KeyFilter::detail("users", "7")).await, 1);
        assert_eq!(store.lookup(&key).await, Lookup::Missing);
        assert_eq!(store.remove(&KeyFilter::detail("users", "7")).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_receive_events() {
        let store = QueryStore::new(10);
        let key = detail_key("events", "1");
        let mut receiver = store.subscribe(&key).await;

        store.set(key.clone(), data("a"), QueryTiming::detail()).await;
        store.invalidate(&KeyFilter::resource("events")).await;
        store.remove(&KeyFilter::Exact(key.clone())).await;

        assert_eq!(receiver.recv().await.unwrap(), StoreEvent::Updated(key.clone()));
        assert_eq!(
            receiver.recv().await.unwrap(),
            StoreEvent::Invalidated(key.clone())
        );
        assert_eq!(receiver.recv().await.unwrap(), StoreEvent::Removed(key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lru_eviction_notifies() {
        let store = QueryStore::new(2);
        let first = detail_key("users", "1");
        let mut receiver = store.subscribe(&first).await;

        store.set(first.clone(), data("1"), QueryTiming::detail()).await;
        store.set(detail_key("users", "2"), data("2"), QueryTiming::detail()).await;
        store.set(detail_key("users", "3"), data("3"), QueryTiming::detail()).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.lookup(&first).await, Lookup::Missing);
        assert_eq!(receiver.recv().await.unwrap(), StoreEvent::Updated(first.clone()));
        assert_eq!(receiver.recv().await.unwrap(), StoreEvent::Evicted(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_garbage_collection_drops_expired_entries() {
        let store = QueryStore::new(10);
        let expired = list_key("users", &ListParams::default());
        let live = detail_key("users", "1");
        store.set(expired.clone(), data("a"), QueryTiming::list()).await;

        tokio::time::advance(Duration::from_secs(601)).await;
        store.set(live.clone(), data("b"), QueryTiming::detail()).await;

        assert_eq!(store.collect_garbage().await, 1);
        assert!(store.get(&expired).await.is_none());
        assert!(store.get(&live).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_garbage_collection_keeps_observed_entries() {
        let store = QueryStore::new(10);
        let key = list_key("users", &ListParams::default());
        store.set(key.clone(), data("a"), QueryTiming::list()).await;
        let receiver = store.subscribe(&key).await;

        tokio::time::advance(Duration::from_secs(601)).await;
        assert_eq!(store.collect_garbage().await, 0);
        assert!(store.get(&key).await.is_some());

        drop(receiver);
        assert_eq!(store.collect_garbage().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = QueryStore::new(10);
        store
            .set(detail_key("users", "1"), data("a"), QueryTiming::detail())
            .await;
        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one_entry() {
        let store = QueryStore::new(0);
        store
            .set(detail_key("users", "1"), data("a"), QueryTiming::detail())
            .await;
        store
            .set(detail_key("users", "2"), data("b"), QueryTiming::detail())
            .await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.keys().await, vec![detail_key("users", "2")]);
    }
}
