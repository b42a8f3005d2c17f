use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// A stored response: raw body bytes plus the headers it was served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
  pub status: u16,
  pub headers: BTreeMap<String, String>,
  pub body: Bytes,
}

impl StoredResponse {
  pub fn new(status: u16, headers: BTreeMap<String, String>, body: impl Into<Bytes>) -> Self {
    Self {
      status,
      headers,
      body: body.into(),
    }
  }

  /// The `content-type` header, if the response carried one.
  pub fn content_type(&self) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
      .map(|(_, value)| value.as_str())
  }
}

/// Blob storage trait.
///
/// Entries are addressed by `(namespace, key)`. The store does no key
/// normalization of its own: callers decide what a key is.
#[async_trait]
pub trait BlobStore: Send + Sync {
  /// Look up an entry.
  async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredResponse>, StoreError>;

  /// Store an entry, replacing any previous one under the same key.
  async fn put(&self, namespace: &str, key: &str, response: StoredResponse)
  -> Result<(), StoreError>;

  /// Delete a whole namespace. Returns whether the namespace existed.
  async fn delete_namespace(&self, namespace: &str) -> Result<bool, StoreError>;
}

/// Handle to one namespace of a [`BlobStore`].
#[derive(Clone)]
pub struct Namespace {
  store: Arc<dyn BlobStore>,
  name: String,
}

impl Namespace {
  /// Open a namespace. Opening never touches the backing store.
  pub fn open(store: Arc<dyn BlobStore>, name: impl Into<String>) -> Self {
    Self {
      store,
      name: name.into(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Find the entry stored under `key`.
  pub async fn find(&self, key: &str) -> Result<Option<StoredResponse>, StoreError> {
    self.store.get(&self.name, key).await
  }

  /// Store `response` under `key`.
  pub async fn put(&self, key: &str, response: StoredResponse) -> Result<(), StoreError> {
    self.store.put(&self.name, key, response).await
  }

  /// Delete this namespace from the backing store.
  pub async fn delete(self) -> Result<bool, StoreError> {
    self.store.delete_namespace(&self.name).await
  }
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
  namespaces: RwLock<HashMap<String, HashMap<String, StoredResponse>>>,
}

impl InMemoryBlobStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of entries in a namespace.
  pub async fn entry_count(&self, namespace: &str) -> usize {
    self
      .namespaces
      .read()
      .await
      .get(namespace)
      .map_or(0, HashMap::len)
  }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
  async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredResponse>, StoreError> {
    let namespaces = self.namespaces.read().await;
    Ok(namespaces.get(namespace).and_then(|ns| ns.get(key)).cloned())
  }

  async fn put(
    &self,
    namespace: &str,
    key: &str,
    response: StoredResponse,
  ) -> Result<(), StoreError> {
    self
      .namespaces
      .write()
      .await
      .entry(namespace.to_string())
      .or_default()
      .insert(key.to_string(), response);
    Ok(())
  }

  async fn delete_namespace(&self, namespace: &str) -> Result<bool, StoreError> {
    Ok(self.namespaces.write().await.remove(namespace).is_some())
  }
}
