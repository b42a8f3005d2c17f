use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Trait for durable key-value storage.
///
/// Values are opaque strings: callers serialize before writing and parse
/// after reading. Every write replaces the whole value for its key, so a
/// reader never observes a partially written record.
#[async_trait]
pub trait KvStore: Send + Sync {
  /// Read a value by key.
  async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

  /// Write a value, replacing any previous one.
  async fn write(&self, key: &str, value: String) -> Result<(), StoreError>;

  /// Remove a value. Removing a missing key is not an error.
  async fn remove(&self, key: &str) -> Result<(), StoreError>;

  /// Remove every value.
  async fn clear_all(&self) -> Result<(), StoreError>;
}

/// In-memory KV store implementation.
///
/// Nothing survives the process. Suitable for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
  data: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored keys.
  pub async fn len(&self) -> usize {
    self.data.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.data.read().await.is_empty()
  }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
  async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
    Ok(self.data.read().await.get(key).cloned())
  }

  async fn write(&self, key: &str, value: String) -> Result<(), StoreError> {
    self.data.write().await.insert(key.to_string(), value);
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<(), StoreError> {
    self.data.write().await.remove(key);
    Ok(())
  }

  async fn clear_all(&self) -> Result<(), StoreError> {
    self.data.write().await.clear();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_in_memory_kv_store() {
    let store = InMemoryKvStore::new();

    assert_eq!(store.read("key").await.unwrap(), None);

    store.write("key", "value".to_string()).await.unwrap();
    assert_eq!(store.read("key").await.unwrap(), Some("value".to_string()));

    store.write("key", "updated".to_string()).await.unwrap();
    assert_eq!(store.read("key").await.unwrap(), Some("updated".to_string()));

    store.remove("key").await.unwrap();
    assert_eq!(store.read("key").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_remove_missing_key_is_ok() {
    let store = InMemoryKvStore::new();
    assert!(store.remove("missing").await.is_ok());
  }

  #[tokio::test]
  async fn test_clear_all() {
    let store = InMemoryKvStore::new();
    store.write("a", "1".to_string()).await.unwrap();
    store.write("b", "2".to_string()).await.unwrap();
    assert_eq!(store.len().await, 2);

    store.clear_all().await.unwrap();
    assert!(store.is_empty().await);
  }
}
