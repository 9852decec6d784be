//! Durable client-side key/value storage.
//!
//! The persisted bearer token lives here under [`TOKEN_KEY`]. Only the
//! [`SessionManager`](crate::SessionManager) writes it; the
//! [`ApiClient`](crate::ApiClient) reads it for every request and removes it
//! when the backend rejects the credentials.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Fixed storage key of the persisted bearer token.
pub const TOKEN_KEY: &str = "token";

/// Failure reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage backend error: {0}")]
pub struct StorageError(pub String);

/// Process-wide key/value storage shared by the client and the session manager.
///
/// Each call is one atomic step: a `set` or `remove` that returned is visible
/// to every subsequent `get`.
#[async_trait]
pub trait ClientStorage: Debug + Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
