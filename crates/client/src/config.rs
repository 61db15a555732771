use std::fmt;
use std::str::FromStr;
use std::{env, time::Duration};

use campusync_core::query::QueryTiming;

use crate::error::ClientError;

/// Whether reads and writes go to the real backend or to fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl FromStr for Mode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Mode::Development),
            "prod" | "production" => Ok(Mode::Production),
            other => Err(ClientError::Config(format!("unknown mode: {}", other))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (default: "http://localhost:5000/api")
    pub base_url: String,
    /// Bearer token sent with every request (default: none)
    pub token: Option<String>,
    /// Development or production (default: production)
    pub mode: Mode,
    /// Freshness window of list reads in seconds (default: 300)
    pub list_stale_seconds: u64,
    /// Garbage-collection window of list reads in seconds (default: 600)
    pub list_gc_seconds: u64,
    /// Freshness window of single-record reads in seconds (default: 600)
    pub detail_stale_seconds: u64,
    /// Garbage-collection window of single-record reads in seconds (default: 1,800)
    pub detail_gc_seconds: u64,
    /// Maximum number of cached entries (default: 1,000)
    pub cache_max_entries: usize,
    /// Interval between garbage-collection sweeps in seconds (default: 60)
    pub gc_interval_seconds: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CAMPUSYNC_URL` - Backend base URL (default: "http://localhost:5000/api")
    /// - `CAMPUSYNC_TOKEN` - Bearer token (default: none)
    /// - `CAMPUSYNC_MODE` - `development` or `production` (default: production)
    /// - `LIST_STALE_SECONDS` - List freshness window (default: 300)
    /// - `LIST_GC_SECONDS` - List garbage-collection window (default: 600)
    /// - `DETAIL_STALE_SECONDS` - Record freshness window (default: 600)
    /// - `DETAIL_GC_SECONDS` - Record garbage-collection window (default: 1,800)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1,000)
    /// - `GC_INTERVAL_SECONDS` - Garbage-collection sweep interval (default: 60)
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("CAMPUSYNC_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            token: env::var("CAMPUSYNC_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            mode: env_or("CAMPUSYNC_MODE", Mode::Production),
            list_stale_seconds: env_or("LIST_STALE_SECONDS", 300),
            list_gc_seconds: env_or("LIST_GC_SECONDS", 600),
            detail_stale_seconds: env_or("DETAIL_STALE_SECONDS", 600),
            detail_gc_seconds: env_or("DETAIL_GC_SECONDS", 1_800),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", 1_000),
            gc_interval_seconds: env_or("GC_INTERVAL_SECONDS", 60),
        }
    }

    /// Timing applied to list reads.
    pub fn list_timing(&self) -> QueryTiming {
        QueryTiming::new(
            Duration::from_secs(self.list_stale_seconds),
            Duration::from_secs(self.list_gc_seconds),
        )
    }

    /// Timing applied to single-record reads.
    pub fn detail_timing(&self) -> QueryTiming {
        QueryTiming::new(
            Duration::from_secs(self.detail_stale_seconds),
            Duration::from_secs(self.detail_gc_seconds),
        )
    }

    /// Get the garbage-collection interval as a Duration, at least one second.
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_seconds.max(1))
    }

    /// The fixture backend is used in development mode and whenever no
    /// token is configured.
    pub fn use_mock_backend(&self) -> bool {
        self.mode == Mode::Development || self.token.is_none()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
