//! Key-value persistence abstraction
//!
//! The core itself owns no persistent state; settings and the cached push
//! token go through this trait so the host can pick a backend: sled on
//! device, memory in tests and simulators.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use thiserror::Error;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

// ============================================================================
// TRAIT & BACKENDS
// ============================================================================

/// Minimal key-value contract for app preferences
pub trait KeyValueStore: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend for tests and temporary sessions
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().remove(key);
        Ok(())
    }
}

/// On-device backend over sled
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.db
            .insert(key, value)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .db
            .get(key)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.db
            .remove(key)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
