//! In-memory storage backend
//!
//! DashMap-backed implementation of `StateStore`, used by the test suite
//! and by the `memory` backend mode for local experimentation. Not durable.

use async_trait::async_trait;
use dashmap::DashMap;

use tfbridge_common::BridgeError;

use crate::model::StateObject;
use crate::traits::StateStore;

/// Non-durable `StateStore` keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    objects: DashMap<String, StateObject>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct paths currently stored.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn retrieve(&self, path: &str) -> Result<StateObject, BridgeError> {
        self.objects
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or(BridgeError::NotFound)
    }

    async fn store(&self, path: &str, object: &StateObject) -> Result<(), BridgeError> {
        self.objects.insert(path.to_string(), object.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_retrieve_absent_is_not_found() {
        let store = MemoryStateStore::new();
        let err = store.retrieve("prod/network").await.unwrap_err();
        assert!(matches!(err, BridgeError::NotFound));
    }

    #[tokio::test]
    async fn test_store_then_retrieve() {
        let store = MemoryStateStore::new();
        let obj = StateObject {
            lock_id: "t1".to_string(),
            state: b"payload".to_vec(),
        };
        store.store("prod/network", &obj).await.unwrap();
        assert_eq!(store.retrieve("prod/network").await.unwrap(), obj);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_paths_are_independent() {
        let store = MemoryStateStore::new();
        store
            .store("a", &StateObject::locked_empty("x"))
            .await
            .unwrap();
        assert!(matches!(
            store.retrieve("b").await.unwrap_err(),
            BridgeError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_native_lock_is_unsupported() {
        let store = MemoryStateStore::new();
        assert!(!store.native_lock("a").await.unwrap());
        assert!(!store.native_unlock("a").await.unwrap());
    }
}
