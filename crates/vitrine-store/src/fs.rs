//! Filesystem-backed stores.
//!
//! Layout under the data directory:
//! ```text
//! {data_dir}/
//! ├── store.json                 # FsKvStore: one JSON object, rewritten whole
//! └── images/
//!     └── google-arts-images/    # one directory per blob namespace
//!         ├── 3f2a…e1.body       # raw bytes
//!         └── 3f2a…e1.json       # status + headers, written last
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::blob::{BlobStore, StoredResponse};
use crate::error::StoreError;
use crate::kv::KvStore;

/// Key-value store persisted as a single JSON object file.
///
/// Every mutation rewrites the whole file through a temp file + rename, so
/// the file on disk is always a complete snapshot. A file that does not
/// parse reads as empty and is replaced by the next write.
pub struct FsKvStore {
  path: PathBuf,
  lock: Mutex<()>,
}

impl FsKvStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      lock: Mutex::new(()),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
    match fs::read_to_string(&self.path).await {
      Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
      Ok(content) => match serde_json::from_str(&content) {
        Ok(data) => Ok(data),
        Err(e) => {
          warn!(path = %self.path.display(), error = %e, "corrupt store file, starting empty");
          Ok(HashMap::new())
        }
      },
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
      Err(e) => Err(e.into()),
    }
  }

  async fn save(&self, data: &HashMap<String, String>) -> Result<(), StoreError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(data)?;
    let tmp = self.path.with_extension("json.tmp");
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, &self.path).await?;
    Ok(())
  }
}

#[async_trait]
impl KvStore for FsKvStore {
  async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
    let _guard = self.lock.lock().await;
    Ok(self.load().await?.remove(key))
  }

  async fn write(&self, key: &str, value: String) -> Result<(), StoreError> {
    let _guard = self.lock.lock().await;
    let mut data = self.load().await?;
    data.insert(key.to_string(), value);
    self.save(&data).await
  }

  async fn remove(&self, key: &str) -> Result<(), StoreError> {
    let _guard = self.lock.lock().await;
    let mut data = self.load().await?;
    if data.remove(key).is_some() {
      self.save(&data).await?;
    }
    Ok(())
  }

  async fn clear_all(&self) -> Result<(), StoreError> {
    let _guard = self.lock.lock().await;
    self.save(&HashMap::new()).await
  }
}

/// Metadata written next to each blob body.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
  key: String,
  status: u16,
  headers: BTreeMap<String, String>,
}

/// Blob store keeping one directory per namespace.
pub struct FsBlobStore {
  root: PathBuf,
}

impl FsBlobStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Namespace names come from provider names; anything outside a safe
  /// filename alphabet is replaced.
  fn namespace_dir(&self, namespace: &str) -> PathBuf {
    let safe: String = namespace
      .chars()
      .map(|c| {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
          c
        } else {
          '_'
        }
      })
      .collect();
    self.root.join(safe)
  }

  fn entry_stem(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
  }
}

#[async_trait]
impl BlobStore for FsBlobStore {
  async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredResponse>, StoreError> {
    let dir = self.namespace_dir(namespace);
    let stem = Self::entry_stem(key);
    let meta_path = dir.join(format!("{stem}.json"));

    let meta_content = match fs::read_to_string(&meta_path).await {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    let meta: EntryMeta = match serde_json::from_str(&meta_content) {
      Ok(meta) => meta,
      Err(e) => {
        warn!(namespace, key, error = %e, "corrupt blob metadata, treating as miss");
        return Ok(None);
      }
    };

    if meta.key != key {
      debug!(namespace, key, stored = %meta.key, "blob key hash collision, treating as miss");
      return Ok(None);
    }

    let body = match fs::read(dir.join(format!("{stem}.body"))).await {
      Ok(body) => body,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    Ok(Some(StoredResponse::new(meta.status, meta.headers, body)))
  }

  async fn put(
    &self,
    namespace: &str,
    key: &str,
    response: StoredResponse,
  ) -> Result<(), StoreError> {
    let dir = self.namespace_dir(namespace);
    fs::create_dir_all(&dir).await?;

    let stem = Self::entry_stem(key);
    fs::write(dir.join(format!("{stem}.body")), &response.body).await?;

    // The metadata file marks the entry as complete, so it goes last.
    let meta = EntryMeta {
      key: key.to_string(),
      status: response.status,
      headers: response.headers,
    };
    fs::write(dir.join(format!("{stem}.json")), serde_json::to_vec(&meta)?).await?;
    Ok(())
  }

  async fn delete_namespace(&self, namespace: &str) -> Result<bool, StoreError> {
    match fs::remove_dir_all(self.namespace_dir(namespace)).await {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e.into()),
    }
  }
}
