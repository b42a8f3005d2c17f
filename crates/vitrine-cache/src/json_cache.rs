use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use vitrine_store::KvStore;

use crate::clock::{Clock, SystemClock};
use crate::error::CacheError;

/// 24 hours.
pub const DEFAULT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// The closed set of keys a namespace may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
  Timestamp,
  Assets,
  Ids,
  Data,
}

impl CacheKey {
  pub const ALL: [CacheKey; 4] = [
    CacheKey::Timestamp,
    CacheKey::Assets,
    CacheKey::Ids,
    CacheKey::Data,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      CacheKey::Timestamp => "timestamp",
      CacheKey::Assets => "assets",
      CacheKey::Ids => "ids",
      CacheKey::Data => "data",
    }
  }
}

/// Cache-aside JSON storage over a [`KvStore`].
///
/// Entries live under `"{namespace}:cache:{key}"`. A namespace is valid while
/// `now - timestamp < ttl`; reads from an invalid namespace are misses.
pub struct JsonCache {
  store: Arc<dyn KvStore>,
  clock: Arc<dyn Clock>,
  ttl_ms: i64,
}

impl JsonCache {
  pub fn new(store: Arc<dyn KvStore>) -> Self {
    Self::with_clock(store, Arc::new(SystemClock))
  }

  pub fn with_clock(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
    Self {
      store,
      clock,
      ttl_ms: DEFAULT_TTL_MS,
    }
  }

  pub fn with_ttl(mut self, ttl_ms: i64) -> Self {
    self.ttl_ms = ttl_ms;
    self
  }

  pub fn ttl_ms(&self) -> i64 {
    self.ttl_ms
  }

  /// Whether the namespace has a timestamp younger than the TTL.
  pub async fn is_valid(&self, namespace: &str) -> bool {
    let Some(raw) = self.read(namespace, CacheKey::Timestamp).await else {
      return false;
    };

    let Ok(timestamp) = raw.trim().parse::<i64>() else {
      warn!(namespace, "ignoring malformed cache timestamp");
      return false;
    };

    self.clock.now_ms() - timestamp < self.ttl_ms
  }

  /// Read a cached value. Expired, absent and undecodable entries are all
  /// `None`.
  pub async fn get<T: DeserializeOwned>(&self, namespace: &str, key: CacheKey) -> Option<T> {
    if !self.is_valid(namespace).await {
      debug!(namespace, key = key.as_str(), "cache miss (expired or unset)");
      return None;
    }

    let raw = self.read(namespace, key).await?;
    match serde_json::from_str(&raw) {
      Ok(value) => {
        debug!(namespace, key = key.as_str(), "cache hit");
        Some(value)
      }
      Err(e) => {
        warn!(namespace, key = key.as_str(), error = %e, "corrupt cache entry, treating as miss");
        None
      }
    }
  }

  /// Write a value and refresh the namespace timestamp.
  pub async fn set<T: Serialize + ?Sized>(
    &self,
    namespace: &str,
    key: CacheKey,
    value: &T,
  ) -> Result<(), CacheError> {
    let payload = serde_json::to_string(value)?;
    self
      .store
      .write(&storage_key(namespace, key), payload)
      .await?;
    self
      .store
      .write(
        &storage_key(namespace, CacheKey::Timestamp),
        self.clock.now_ms().to_string(),
      )
      .await?;
    Ok(())
  }

  /// Remove the timestamp and every well-known key of a namespace.
  pub async fn clear(&self, namespace: &str) -> Result<(), CacheError> {
    for key in CacheKey::ALL {
      self.store.remove(&storage_key(namespace, key)).await?;
    }
    debug!(namespace, "cache namespace cleared");
    Ok(())
  }

  async fn read(&self, namespace: &str, key: CacheKey) -> Option<String> {
    match self.store.read(&storage_key(namespace, key)).await {
      Ok(value) => value,
      Err(e) => {
        warn!(namespace, key = key.as_str(), error = %e, "cache read failed, treating as miss");
        None
      }
    }
  }
}

fn storage_key(namespace: &str, key: CacheKey) -> String {
  format!("{}:cache:{}", namespace, key.as_str())
}
