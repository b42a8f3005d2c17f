use vitrine_store::StoreError;

/// Errors from the cache layer.
///
/// `Clone` so one failed in-flight load can be handed to every caller that
/// joined it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
  #[error("storage error: {message}")]
  Store { message: String },

  #[error("failed to fetch '{url}': {message}")]
  Fetch { url: String, message: String },

  #[error("fetch of '{url}' returned status {status}")]
  Status { url: String, status: u16 },

  #[error("serialization error: {message}")]
  Serialize { message: String },
}

impl From<StoreError> for CacheError {
  fn from(e: StoreError) -> Self {
    CacheError::Store {
      message: e.to_string(),
    }
  }
}

impl From<serde_json::Error> for CacheError {
  fn from(e: serde_json::Error) -> Self {
    CacheError::Serialize {
      message: e.to_string(),
    }
  }
}
