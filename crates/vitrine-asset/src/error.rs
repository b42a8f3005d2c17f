/// Errors from decoding assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
  #[error("failed to decode asset: {0}")]
  Decode(#[from] serde_json::Error),
}
