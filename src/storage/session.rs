//! In-memory session draft storage using moka
//!
//! Keeps one draft per browsing session. Abandoned sessions are evicted after
//! the idle timeout so drafts never outlive the visit that created them.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::Serialize;
use tracing::info;

use super::{KeyValueStore, StorageError};
use crate::config::StorageConfig;

/// Session-scoped draft cache
#[derive(Clone)]
pub struct SessionStore {
    drafts: Cache<String, Arc<str>>,
}

impl SessionStore {
    /// Create a store holding at most `max_sessions` drafts, each kept for
    /// `time_to_live` and dropped after `time_to_idle` without writes or reads.
    pub fn new(max_sessions: u64, time_to_live: Duration, time_to_idle: Duration) -> Self {
        Self {
            drafts: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_live(time_to_live)
                .time_to_idle(time_to_idle)
                .build(),
        }
    }

    /// 10k sessions, idle timeout as given, hard limit of a day.
    pub fn with_idle_timeout(time_to_idle: Duration) -> Self {
        Self::new(10_000, Duration::from_secs(24 * 60 * 60), time_to_idle)
    }

    /// Idle timeout from `QUOTE_SESSION_TTL_MINS`.
    pub fn from_config(config: &StorageConfig) -> Self {
        info!(idle_mins = config.session_ttl.as_secs() / 60, "Session draft store configured");
        Self::with_idle_timeout(config.session_ttl)
    }

    /// Get store statistics for monitoring
    pub fn stats(&self) -> SessionStoreStats {
        self.drafts.run_pending_tasks();
        SessionStoreStats {
            drafts: self.drafts.entry_count(),
        }
    }

    /// Drop every stored draft
    pub fn invalidate_all(&self) {
        self.drafts.invalidate_all();
        info!("All session drafts invalidated");
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(Duration::from_secs(2 * 60 * 60))
    }
}

impl KeyValueStore for SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.drafts.get(key).map(|value| value.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.drafts.insert(key.to_string(), Arc::from(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.drafts.invalidate(key);
        Ok(())
    }
}

/// Session store statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SessionStoreStats {
    pub drafts: u64,
}
