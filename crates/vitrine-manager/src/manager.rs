use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use vitrine_asset::Asset;
use vitrine_cache::{Clock, SystemClock};
use vitrine_provider::{ArtProvider, ProviderInfo, ProviderRegistry};
use vitrine_store::KvStore;

use crate::error::ManagerError;
use crate::settings::{UserSettingUpdate, UserSettings};
use crate::state::{ART_STATE_KEY, ArtState};

/// Facade over the provider registry and the persisted [`ArtState`].
///
/// Every mutation writes the whole state under [`ART_STATE_KEY`] before it
/// becomes visible in memory, so a failed write leaves the state unchanged.
pub struct ArtManager {
  registry: ProviderRegistry,
  store: Arc<dyn KvStore>,
  clock: Arc<dyn Clock>,
  state: Mutex<ArtState>,
}

impl ArtManager {
  /// Restore the manager from `store`.
  pub async fn load(
    registry: ProviderRegistry,
    store: Arc<dyn KvStore>,
  ) -> Result<Self, ManagerError> {
    Self::load_with_clock(registry, store, Arc::new(SystemClock)).await
  }

  /// Restore the manager from `store`, stamping mutations with `clock`.
  ///
  /// A missing or unreadable record yields the defaults. A record naming an
  /// unregistered provider is reset to the default provider at index 0 and
  /// written back.
  pub async fn load_with_clock(
    registry: ProviderRegistry,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
  ) -> Result<Self, ManagerError> {
    let default_name = registry.default_provider().name();
    let defaults = ArtState::new(default_name, clock.now_ms());

    let stored = store.read(ART_STATE_KEY).await.unwrap_or_else(|e| {
      warn!(error = %e, "failed to read stored art state, using defaults");
      None
    });
    let state = match stored {
      Some(json) => defaults.clone().merge_json(&json).unwrap_or_else(|e| {
        warn!(error = %e, "failed to parse stored art state, using defaults");
        defaults
      }),
      None => defaults,
    };

    let heal = !registry.contains(&state.provider);
    let manager = Self {
      registry,
      store,
      clock,
      state: Mutex::new(state),
    };

    if heal {
      let mut state = manager.state.lock().await;
      warn!(
        provider = %state.provider,
        fallback = default_name,
        "stored provider is not registered, falling back"
      );
      let mut healed = state.clone();
      healed.provider = default_name.to_string();
      healed.current_index = 0;
      manager.commit(&mut state, healed).await?;
    }

    Ok(manager)
  }

  pub fn registry(&self) -> &ProviderRegistry {
    &self.registry
  }

  /// Registered providers in registration order.
  pub fn providers(&self) -> Vec<ProviderInfo> {
    self.registry.entries()
  }

  pub async fn current_provider(&self) -> Arc<dyn ArtProvider> {
    let name = self.state.lock().await.provider.clone();
    self
      .registry
      .get(&name)
      .unwrap_or_else(|| self.registry.default_provider())
      .clone()
  }

  pub async fn state(&self) -> ArtState {
    self.state.lock().await.clone()
  }

  /// Switch to `name` at index 0.
  pub async fn set_current_provider(&self, name: &str) -> Result<(), ManagerError> {
    self.select(name, 0).await
  }

  /// Switch to `name` at `index` in one write.
  pub async fn select(&self, name: &str, index: usize) -> Result<(), ManagerError> {
    if !self.registry.contains(name) {
      return Err(ManagerError::unknown_provider(name));
    }

    let mut state = self.state.lock().await;
    let mut next = state.clone();
    next.provider = name.to_string();
    next.current_index = index;
    self.commit(&mut state, next).await?;

    info!(provider = name, index, "provider selected");
    Ok(())
  }

  pub async fn current_index(&self) -> usize {
    self.state.lock().await.current_index
  }

  pub async fn set_current_index(&self, index: usize) -> Result<(), ManagerError> {
    let mut state = self.state.lock().await;
    let mut next = state.clone();
    next.current_index = index;
    self.commit(&mut state, next).await
  }

  pub async fn turnover_always(&self) -> bool {
    self.state.lock().await.turnover_always
  }

  pub async fn set_turnover_always(&self, value: bool) -> Result<(), ManagerError> {
    let mut state = self.state.lock().await;
    let mut next = state.clone();
    next.turnover_always = value;
    self.commit(&mut state, next).await
  }

  pub async fn user_settings(&self) -> UserSettings {
    let state = self.state.lock().await;
    UserSettings {
      turnover_always: state.turnover_always,
      art_provider: state.provider.clone(),
    }
  }

  pub async fn set_user_setting(&self, update: UserSettingUpdate) -> Result<(), ManagerError> {
    match update {
      UserSettingUpdate::TurnoverAlways(value) => self.set_turnover_always(value).await,
      UserSettingUpdate::ArtProvider(name) => self.set_current_provider(&name).await,
    }
  }

  pub async fn sync_data(&self) -> bool {
    self.current_provider().await.sync_data().await
  }

  pub async fn synced_asset_count(&self) -> usize {
    self.current_provider().await.synced_asset_count().await
  }

  pub async fn get_asset(&self, index: usize) -> Option<Arc<Asset>> {
    self.current_provider().await.get_asset(index).await
  }

  pub async fn load_image(&self, index: usize) -> bool {
    self.current_provider().await.load_image(index).await
  }

  pub async fn display_image_url(&self, index: usize) -> Option<String> {
    self.current_provider().await.display_image_url(index).await
  }

  /// Details page for the asset at `index` of the active provider.
  pub async fn details_url(&self, index: usize) -> Option<String> {
    let provider = self.current_provider().await;
    let asset = provider.get_asset(index).await?;
    Some(provider.details_url(&asset))
  }

  /// Drop one provider's cached metadata and images.
  pub async fn clear_provider_cache(&self, name: &str) -> Result<(), ManagerError> {
    let provider = self
      .registry
      .get(name)
      .ok_or_else(|| ManagerError::unknown_provider(name))?;
    provider.clear_cache().await?;
    info!(provider = name, "provider cache cleared");
    Ok(())
  }

  async fn commit(&self, state: &mut ArtState, mut next: ArtState) -> Result<(), ManagerError> {
    next.last_updated = self.clock.now_ms();
    let json = serde_json::to_string(&next)?;
    self.store.write(ART_STATE_KEY, json).await?;
    *state = next;
    Ok(())
  }
}
