/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A value could not be encoded for storage.
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

