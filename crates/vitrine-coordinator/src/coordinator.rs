use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use vitrine_manager::{ArtManager, UserSettingUpdate, UserSettings};
use vitrine_provider::ArtProvider;

use crate::error::CoordinatorError;
use crate::message::{Command, CurrentArt, Notification, Reply};
use crate::notify::Broadcaster;

/// How many indices a rotation probes before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Serializes rotation and provider switches against the [`ArtManager`].
///
/// Holds `live_index`, an in-memory copy of the last accepted index, so
/// "what is showing" queries don't go back to the manager.
pub struct BackgroundCoordinator {
  manager: Arc<ArtManager>,
  broadcaster: Arc<dyn Broadcaster>,
  live_index: RwLock<Option<usize>>,
  operation: Mutex<()>,
  max_attempts: usize,
}

impl BackgroundCoordinator {
  pub fn new(manager: Arc<ArtManager>, broadcaster: Arc<dyn Broadcaster>) -> Self {
    Self {
      manager,
      broadcaster,
      live_index: RwLock::new(None),
      operation: Mutex::new(()),
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }

  pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
    self.max_attempts = max_attempts.max(1);
    self
  }

  pub fn manager(&self) -> &Arc<ArtManager> {
    &self.manager
  }

  /// Startup: sync the active provider, pull an out-of-range index back to
  /// 0 and warm the current image.
  pub async fn initialize(&self) -> Result<usize, CoordinatorError> {
    let _op = self.operation.lock().await;

    if !self.manager.sync_data().await {
      error!("failed to sync asset data during startup");
      return Err(CoordinatorError::SyncFailed);
    }

    let total = self.manager.synced_asset_count().await;
    let mut index = self.manager.current_index().await;
    if index >= total {
      debug!(index, total, "stored index out of range, resetting");
      index = 0;
    }
    self.manager.set_current_index(index).await?;
    *self.live_index.write().await = Some(index);

    if !self.manager.load_image(index).await {
      warn!(index, "failed to preload current image");
    }

    info!(index, total, "coordinator initialized");
    Ok(index)
  }

  /// Dispatch one command.
  pub async fn handle(&self, command: Command) -> Result<Reply, CoordinatorError> {
    match command {
      Command::RotateToNext { current_index } => {
        if let Some(seen) = current_index {
          debug!(seen, "rotate requested");
        }
        let index = self.rotate_to_next().await?;
        Ok(Reply::CurrentIndex {
          current_index: index,
        })
      }
      Command::SwitchProvider { provider_name } => {
        let index = self.switch_provider(&provider_name).await?;
        Ok(Reply::CurrentIndex {
          current_index: index,
        })
      }
      Command::UpdateSetting { key, value } => {
        let update = UserSettingUpdate::parse(&key, value)?;
        Ok(Reply::Settings(self.update_setting(update).await?))
      }
      Command::RequestCurrentAsset => Ok(Reply::CurrentIndex {
        current_index: self.current_asset_index().await,
      }),
      Command::GetCurrentArt => match self.current_art().await {
        Ok(art) => Ok(Reply::CurrentArt(art)),
        Err(e) if e.is_soft() => Ok(Reply::Error {
          error: e.to_string(),
        }),
        Err(e) => Err(e),
      },
    }
  }

  /// The index currently showing.
  pub async fn current_asset_index(&self) -> usize {
    if let Some(index) = *self.live_index.read().await {
      return index;
    }

    let index = self.manager.current_index().await;
    *self.live_index.write().await = Some(index);
    index
  }

  /// Resolve the current artwork, moving off a non-displayable index if
  /// needed.
  pub async fn current_art(&self) -> Result<CurrentArt, CoordinatorError> {
    let _op = self.operation.lock().await;
    let provider = self.manager.current_provider().await;

    if !provider.sync_data().await {
      return Err(CoordinatorError::SyncFailed);
    }

    let total = provider.synced_asset_count().await;
    if total == 0 {
      return Err(CoordinatorError::NoAssets);
    }

    let mut index = self.manager.current_index().await;
    *self.live_index.write().await = Some(index);

    let asset = match provider.get_asset(index).await {
      Some(asset) => asset,
      None => {
        let Some(found) = self.find_displayable(provider.as_ref(), index, total).await else {
          error!(provider = provider.name(), index, "no displayable asset found");
          return Err(CoordinatorError::NoDisplayableAsset);
        };
        self.manager.set_current_index(found).await?;
        *self.live_index.write().await = Some(found);
        index = found;
        provider
          .get_asset(found)
          .await
          .ok_or(CoordinatorError::AssetUnavailable)?
      }
    };

    if !provider.load_image(index).await {
      warn!(provider = provider.name(), index, "failed to load current image");
    }
    let image_url = provider.display_image_url(index).await;

    Ok(CurrentArt {
      asset: asset.as_ref().clone(),
      image_url,
      total_assets: total,
      current_index: index,
    })
  }

  /// Advance to the next displayable asset, wrapping at the end.
  ///
  /// When no displayable asset turns up within the attempt budget the
  /// state is left unchanged.
  pub async fn rotate_to_next(&self) -> Result<usize, CoordinatorError> {
    let _op = self.operation.lock().await;
    let provider = self.manager.current_provider().await;

    let total = provider.synced_asset_count().await;
    if total == 0 {
      error!(provider = provider.name(), "no assets to rotate through");
      return Err(CoordinatorError::NoAssets);
    }

    let current = self.current_asset_index().await;
    let candidate = (current + 1) % total;

    let Some(index) = self.find_displayable(provider.as_ref(), candidate, total).await else {
      error!(provider = provider.name(), from = current, "rotation found no displayable asset");
      return Err(CoordinatorError::NoDisplayableAsset);
    };

    self.accept(provider.as_ref(), index, total).await?;
    info!(provider = provider.name(), from = current, to = index, "rotated");
    Ok(index)
  }

  /// Make `name` the active provider, positioned on its first displayable
  /// asset.
  pub async fn switch_provider(&self, name: &str) -> Result<usize, CoordinatorError> {
    let _op = self.operation.lock().await;
    self.switch_locked(name).await
  }

  /// Persist one user setting. Changing the provider runs a full switch.
  pub async fn update_setting(
    &self,
    update: UserSettingUpdate,
  ) -> Result<UserSettings, CoordinatorError> {
    let _op = self.operation.lock().await;
    match update {
      UserSettingUpdate::ArtProvider(name) => {
        self.switch_locked(&name).await?;
      }
      other => {
        debug!(key = other.key(), "updating setting");
        self.manager.set_user_setting(other).await?;
      }
    }
    Ok(self.manager.user_settings().await)
  }

  async fn switch_locked(&self, name: &str) -> Result<usize, CoordinatorError> {
    let previous = self.manager.state().await;
    self.manager.set_current_provider(name).await?;
    *self.live_index.write().await = Some(0);

    let provider = self.manager.current_provider().await;
    if !provider.sync_data().await {
      warn!(provider = name, "sync failed after switching provider");
    }
    let total = provider.synced_asset_count().await;

    let found = if total == 0 {
      None
    } else {
      self.find_displayable(provider.as_ref(), 0, total).await
    };

    let Some(index) = found else {
      error!(provider = name, total, "no displayable asset in new provider, reverting");
      self
        .manager
        .select(&previous.provider, previous.current_index)
        .await?;
      *self.live_index.write().await = Some(previous.current_index);
      return Err(if total == 0 {
        CoordinatorError::NoAssets
      } else {
        CoordinatorError::NoDisplayableAsset
      });
    };

    self.accept(provider.as_ref(), index, total).await?;
    info!(provider = name, index, "switched provider");
    Ok(index)
  }

  /// First displayable index at or after `start`, wrapping, within the
  /// attempt budget. Prevalidated providers accept `start` as is.
  async fn find_displayable(
    &self,
    provider: &dyn ArtProvider,
    start: usize,
    total: usize,
  ) -> Option<usize> {
    if total == 0 {
      return None;
    }

    let start = start % total;
    if provider.prevalidated() {
      return Some(start);
    }

    for attempt in 0..self.max_attempts.min(total) {
      let index = (start + attempt) % total;
      if provider.get_asset(index).await.is_some() {
        return Some(index);
      }
      debug!(provider = provider.name(), index, attempt, "skipping non-displayable index");
    }

    None
  }

  async fn accept(
    &self,
    provider: &dyn ArtProvider,
    index: usize,
    total: usize,
  ) -> Result<(), CoordinatorError> {
    self.manager.set_current_index(index).await?;
    *self.live_index.write().await = Some(index);

    if !provider.load_image(index).await {
      warn!(provider = provider.name(), index, "failed to load image");
    }
    let asset = provider.get_asset(index).await;
    let image_url = provider.display_image_url(index).await;

    self.broadcaster.publish(Notification::AssetUpdated {
      new_index: index,
      asset: asset.map(|asset| asset.as_ref().clone()),
      image_url,
      total_assets: Some(total),
    });
    Ok(())
  }
}
