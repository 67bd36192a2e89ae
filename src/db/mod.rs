//! Key-value persistence surface.
//!
//! The watcher only ever needs `get`, `put`, and namespace-scoped buckets;
//! the storage engine behind those is an external collaborator. The
//! in-memory implementation backs the crate's tests and doubles as a
//! reference for the bucket semantics: a bucket is a prefix-scoped view of
//! the same store, and single-key writes are atomic.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Errors surfaced by a key-value store implementation.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal async key-value surface consumed for cursor persistence.
///
/// No multi-key transactional guarantees are required; single-key
/// atomicity is assumed.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError>;

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError>;

    /// A view of this store scoped to a namespace. Keys in different
    /// buckets never collide.
    fn bucket(&self, namespace: &[u8]) -> Arc<dyn KeyValueStore>;
}

/// Hash-map store for tests and small deployments.
#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>,
    prefix: Vec<u8>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn scoped_key(&self, key: &[u8]) -> Vec<u8> {
        let mut scoped = self.prefix.clone();
        scoped.extend_from_slice(key);
        scoped
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| KvError::Storage("store lock poisoned".to_string()))?;
        Ok(entries.get(&self.scoped_key(key)).cloned())
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| KvError::Storage("store lock poisoned".to_string()))?;
        entries.insert(self.scoped_key(key), value.to_vec());
        Ok(())
    }

    fn bucket(&self, namespace: &[u8]) -> Arc<dyn KeyValueStore> {
        let mut prefix = self.prefix.clone();
        prefix.extend_from_slice(namespace);
        // Separator keeps "ab"+"c" and "a"+"bc" distinct.
        prefix.push(b'/');
        Arc::new(InMemoryKvStore {
            entries: self.entries.clone(),
            prefix,
        })
    }
}
