//! Durable key-value storage for quote drafts.
//!
//! The draft store only needs `get`, `set` and `remove` on string values, so
//! any persistence layer can sit behind [`KeyValueStore`].

mod file;
mod memory;
mod session;

use std::sync::Arc;

use uuid::Uuid;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::{SessionStore, SessionStoreStats};

/// Key the draft is stored under when there is no session namespace.
pub const DEFAULT_DRAFT_KEY: &str = "quote-draft";

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage quota exceeded: {requested} bytes requested, {quota} allowed")]
    QuotaExceeded { requested: usize, quota: usize },

    #[error("unsupported draft format version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal persistent dictionary.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Draft key namespaced to one browsing session.
pub fn session_draft_key(base: &str, session_id: Uuid) -> String {
    format!("{}:{}", base, session_id)
}
