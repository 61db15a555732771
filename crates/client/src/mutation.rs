//! Write side: retried mutations followed by cache invalidation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use campusync_core::query::{encode, KeyFilter, QueryKey, QueryTiming, Result};

use crate::notify::Notification;
use crate::query::QueryClient;
use crate::retry::run_with_retry;

/// Which cache entries a successful write affects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationPlan {
    /// Marked stale; the next read re-fetches.
    pub invalidate: Vec<KeyFilter>,
    /// Dropped outright.
    pub remove: Vec<KeyFilter>,
}

impl InvalidationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(mut self, filter: KeyFilter) -> Self {
        self.invalidate.push(filter);
        self
    }

    pub fn remove(mut self, filter: KeyFilter) -> Self {
        self.remove.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.invalidate.is_empty() && self.remove.is_empty()
    }
}

type SeedKey<T> = Box<dyn Fn(&T) -> QueryKey + Send + Sync>;
type DerivedFilters<T> = Box<dyn Fn(&T) -> Vec<KeyFilter> + Send + Sync>;

/// Describes one write: its label for logs, the message shown on success,
/// the invalidation plan, and optionally where to store the returned data.
pub struct MutationSpec<T> {
    pub label: String,
    pub success_message: String,
    pub plan: InvalidationPlan,
    seed: Option<(SeedKey<T>, QueryTiming)>,
    derived: Option<DerivedFilters<T>>,
}

impl<T> MutationSpec<T> {
    pub fn new(label: impl Into<String>, success_message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            success_message: success_message.into(),
            plan: InvalidationPlan::default(),
            seed: None,
            derived: None,
        }
    }

    pub fn with_plan(mut self, plan: InvalidationPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Stores the returned data under the key `key_of` derives from it.
    pub fn seed_with(
        mut self,
        timing: QueryTiming,
        key_of: impl Fn(&T) -> QueryKey + Send + Sync + 'static,
    ) -> Self {
        self.seed = Some((Box::new(key_of), timing));
        self
    }

    /// Also invalidates the families `filters_of` derives from the returned
    /// data, after the static plan.
    pub fn invalidate_with(
        mut self,
        filters_of: impl Fn(&T) -> Vec<KeyFilter> + Send + Sync + 'static,
    ) -> Self {
        self.derived = Some(Box::new(filters_of));
        self
    }
}

impl<T> fmt::Debug for MutationSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationSpec")
            .field("label", &self.label)
            .field("success_message", &self.success_message)
            .field("plan", &self.plan)
            .field("seeds", &self.seed.is_some())
            .field("derives", &self.derived.is_some())
            .finish()
    }
}

impl QueryClient {
    /// Runs a write with the client's retry policy.
    ///
    /// On success the plan is applied (invalidate, then remove, then seed)
    /// and a success notification is raised. On failure the cache is left
    /// untouched and an error notification carries the user-facing message.
    pub async fn mutate<T, F, Fut>(&self, spec: MutationSpec<T>, operation: F) -> Result<T>
    where
        T: Serialize,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match run_with_retry(&self.retry, &spec.label, operation).await {
            Ok(data) => {
                self.apply_plan(&spec, &data).await;
                tracing::debug!(label = %spec.label, "Mutation succeeded");
                self.sink.notify(Notification::success(spec.success_message));
                Ok(data)
            }
            Err(error) => {
                tracing::warn!(label = %spec.label, error = %error, "Mutation failed");
                self.sink.notify(Notification::error(error.user_message()));
                Err(error)
            }
        }
    }

    async fn apply_plan<T: Serialize>(&self, spec: &MutationSpec<T>, data: &T) {
        for filter in &spec.plan.invalidate {
            self.invalidate(filter).await;
        }
        if let Some(filters_of) = &spec.derived {
            for filter in filters_of(data) {
                self.invalidate(&filter).await;
            }
        }
        for filter in &spec.plan.remove {
            self.remove(filter).await;
        }
        if let Some((key_of, timing)) = &spec.seed {
            let key = key_of(data);
            match encode(data) {
                Ok(bytes) => self.store.set(key, Arc::new(bytes), *timing).await,
                Err(e) => tracing::warn!(key = %key, error = %e, "Failed to seed cache"),
            }
        }
    }
}
