mod error;
mod freshness;
mod keys;
mod params;
mod retry;
mod serialization;

pub use error::{QueryError, Result, GENERIC_ERROR_MESSAGE};
pub use freshness::{freshness, Freshness, QueryTiming};
pub use keys::{detail_key, detail_prefix, list_key, list_prefix, resource_prefix, KeyFilter, QueryKey};
pub use params::{FilterSet, Filters, ListParams, DEFAULT_LIMIT, DEFAULT_PAGE, RESERVED_PARAMS};
pub use retry::{retry_delay, should_retry, RetryPolicy, BASE_DELAY, MAX_DELAY, MAX_RETRIES};
pub use serialization::{decode, encode};
