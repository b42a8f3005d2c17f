use vitrine_cache::CacheError;
use vitrine_store::StoreError;

/// Errors from the art manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
  #[error("unknown provider: {name}")]
  UnknownProvider { name: String },

  #[error("invalid setting '{key}': {message}")]
  InvalidSetting { key: String, message: String },

  #[error("storage error: {0}")]
  Store(#[from] StoreError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("cache error: {0}")]
  Cache(#[from] CacheError),
}

impl ManagerError {
  pub fn unknown_provider(name: impl Into<String>) -> Self {
    ManagerError::UnknownProvider { name: name.into() }
  }
}
