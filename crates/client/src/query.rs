//! Read side: cached, de-duplicated, retried queries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use campusync_core::query::{
    decode, encode, KeyFilter, QueryError, QueryKey, QueryTiming, Result, RetryPolicy,
};

use crate::config::Config;
use crate::notify::{NotificationSink, TracingSink};
use crate::retry::run_with_retry;
use crate::store::{Lookup, QueryStore};

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Vec<u8>>>>>;

/// A fetch that is running on its own task.
#[derive(Clone)]
struct InFlight {
    fetch: SharedFetch,
    /// Set when the key is invalidated while the fetch runs; the result is
    /// then stored already stale.
    superseded: Arc<AtomicBool>,
}

/// Outcome of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    /// The read was disabled; nothing was fetched.
    Idle,
    /// Served from a fresh cache entry.
    Cached(T),
    /// Fetched from the backend.
    Fetched(T),
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Idle => None,
            QueryState::Cached(data) | QueryState::Fetched(data) => Some(data),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            QueryState::Idle => None,
            QueryState::Cached(data) | QueryState::Fetched(data) => Some(data),
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, QueryState::Cached(_))
    }
}

/// Per-read options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub enabled: bool,
    pub timing: QueryTiming,
}

impl QueryOptions {
    pub fn new(timing: QueryTiming) -> Self {
        Self {
            enabled: true,
            timing,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::new(QueryTiming::default())
    }
}

/// Owns the query store and executes reads and writes against it.
///
/// Cloning is cheap; clones share the store and the in-flight registry.
#[derive(Clone)]
pub struct QueryClient {
    pub(crate) store: QueryStore,
    in_flight: Arc<Mutex<HashMap<QueryKey, InFlight>>>,
    pub(crate) retry: RetryPolicy,
    pub(crate) sink: Arc<dyn NotificationSink>,
    list_timing: QueryTiming,
    detail_timing: QueryTiming,
}

impl QueryClient {
    pub fn new(store: QueryStore) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            retry: RetryPolicy::default(),
            sink: Arc::new(TracingSink),
            list_timing: QueryTiming::list(),
            detail_timing: QueryTiming::detail(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(QueryStore::new(config.cache_max_entries))
            .with_timings(config.list_timing(), config.detail_timing())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_timings(mut self, list: QueryTiming, detail: QueryTiming) -> Self {
        self.list_timing = list;
        self.detail_timing = detail;
        self
    }

    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn list_timing(&self) -> QueryTiming {
        self.list_timing
    }

    pub fn detail_timing(&self) -> QueryTiming {
        self.detail_timing
    }

    /// Whether a fetch for `key` is currently running.
    pub async fn is_fetching(&self, key: &QueryKey) -> bool {
        self.in_flight.lock().await.contains_key(key)
    }

    /// Reads `key`, calling `fetch` only when there is no fresh entry.
    ///
    /// - disabled reads return [`QueryState::Idle`] without fetching
    /// - a fresh entry is decoded and returned as [`QueryState::Cached`]
    /// - otherwise callers for the same key share one fetch, retried per the
    ///   client's policy; success replaces the entry, failure leaves it as is
    ///
    /// The fetch runs on its own task, so a caller that is dropped does not
    /// cancel it and its result is still stored.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> Result<QueryState<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if !options.enabled {
            tracing::trace!(key = %key, "Query disabled");
            return Ok(QueryState::Idle);
        }

        if let Lookup::Fresh(bytes) = self.store.lookup(&key).await {
            match decode::<T>(&bytes) {
                Ok(value) => {
                    tracing::trace!(key = %key, "Cache hit");
                    return Ok(QueryState::Cached(value));
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "Failed to decode cached entry"),
            }
        } else {
            tracing::trace!(key = %key, "Cache miss");
        }

        let fetch = self.start_fetch(key, options.timing, fetch).await;
        let bytes = fetch.await?;
        Ok(QueryState::Fetched(decode(&bytes)?))
    }

    /// Joins the running fetch for `key`, or starts one.
    async fn start_fetch<T, F, Fut>(&self, key: QueryKey, timing: QueryTiming, fetch: F) -> SharedFetch
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(running) = in_flight.get(&key) {
            tracing::debug!(key = %key, "Joining in-flight fetch");
            return running.fetch.clone();
        }

        let superseded = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_fetch(
            key.clone(),
            timing,
            fetch,
            self.retry,
            self.store.clone(),
            Arc::clone(&self.in_flight),
            Arc::clone(&superseded),
        ));
        let shared = async move {
            task.await
                .unwrap_or_else(|e| Err(QueryError::Aborted(e.to_string())))
        }
        .boxed()
        .shared();

        in_flight.insert(
            key.clone(),
            InFlight {
                fetch: shared.clone(),
                superseded,
            },
        );
        drop(in_flight);

        self.store.notify_fetch_started(&key).await;
        shared
    }

    /// Marks matching entries stale. Fetches already running for them still
    /// store their result, but stale.
    pub async fn invalidate(&self, filter: &KeyFilter) -> usize {
        self.supersede(filter).await;
        self.store.invalidate(filter).await
    }

    /// Drops matching entries.
    pub async fn remove(&self, filter: &KeyFilter) -> usize {
        self.supersede(filter).await;
        self.store.remove(filter).await
    }

    async fn supersede(&self, filter: &KeyFilter) {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|key, running| {
            if filter.matches(key) {
                running.superseded.store(true, Ordering::SeqCst);
                false
            } else {
                true
            }
        });
    }

    /// Spawns a task that sweeps the store every `interval`.
    pub fn spawn_garbage_collector(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let collected = store.collect_garbage().await;
                tracing::trace!(collected, "Garbage collection sweep");
            }
        })
    }
}

async fn run_fetch<T, F, Fut>(
    key: QueryKey,
    timing: QueryTiming,
    fetch: F,
    retry: RetryPolicy,
    store: QueryStore,
    in_flight: Arc<Mutex<HashMap<QueryKey, InFlight>>>,
    superseded: Arc<AtomicBool>,
) -> Result<Arc<Vec<u8>>>
where
    T: Serialize,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let outcome = run_with_retry(&retry, key.as_str(), &fetch)
        .await
        .and_then(|value| encode(&value))
        .map(Arc::new);

    match &outcome {
        Ok(bytes) => {
            store.set(key.clone(), Arc::clone(bytes), timing).await;
            if superseded.load(Ordering::SeqCst) {
                store.invalidate(&KeyFilter::Exact(key.clone())).await;
            }
            tracing::debug!(key = %key, "Fetched");
        }
        Err(e) => tracing::warn!(key = %key, error = %e, "Fetch failed"),
    }

    let mut in_flight = in_flight.lock().await;
    if in_flight
        .get(&key)
        .is_some_and(|running| Arc::ptr_eq(&running.superseded, &superseded))
    {
        in_flight.remove(&key);
    }
    outcome
}
