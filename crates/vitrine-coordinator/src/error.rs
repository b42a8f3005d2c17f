use vitrine_manager::ManagerError;

/// Errors from the coordinator.
///
/// The sync/asset variants display as the short messages shown to users.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
  #[error("unknown command type: '{kind}'")]
  UnknownCommand { kind: String },

  #[error("invalid '{kind}' payload: {message}")]
  InvalidPayload { kind: String, message: String },

  #[error(transparent)]
  Manager(#[from] ManagerError),

  #[error("Failed to sync art data")]
  SyncFailed,

  #[error("No assets available from current provider")]
  NoAssets,

  #[error("No valid assets available")]
  NoDisplayableAsset,

  #[error("Failed to load asset data")]
  AssetUnavailable,

  #[error("coordinator channel closed")]
  ChannelClosed,
}

impl CoordinatorError {
  /// Environmental failures that are answered with an error reply rather
  /// than rejected.
  pub fn is_soft(&self) -> bool {
    matches!(
      self,
      CoordinatorError::SyncFailed
        | CoordinatorError::NoAssets
        | CoordinatorError::NoDisplayableAsset
        | CoordinatorError::AssetUnavailable
    )
  }
}
