//! campusync_client - query cache and REST client for the campusync API.
//!
//! [`QueryClient`] owns the [`QueryStore`] and runs reads (freshness,
//! de-duplication, retry) and writes (retry, invalidation, notification).
//! [`Resource`] binds it to one REST resource through a [`Backend`].

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod mutation;
pub mod notify;
pub mod output;
pub mod query;
pub mod resource;
pub mod retry;
pub mod store;

pub use backend::{AnyBackend, Backend, FileUpload, HttpBackend, MockBackend};
pub use config::{Config, Mode};
pub use error::{ClientError, Result};
pub use mutation::{InvalidationPlan, MutationSpec};
pub use notify::{MemorySink, Notification, NotificationKind, NotificationSink, TracingSink};
pub use query::{QueryClient, QueryOptions, QueryState};
pub use resource::{Campus, Resource};
pub use store::{Lookup, QueryStore, StoreEvent, StoredEntry};
