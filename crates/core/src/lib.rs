//! campusync_core - functional core for the campusync data layer.
//!
//! Pure functions and plain data types: cache keys, query parameters,
//! retry policy, freshness rules, error taxonomy, response envelopes and
//! the academic domain records. Nothing in this crate performs I/O.

pub mod query;
pub mod resources;
