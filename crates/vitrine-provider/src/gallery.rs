use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use vitrine_asset::{ArtAsset, Asset, GALLERY_PROVIDER, GalleryAsset, GalleryRecord};
use vitrine_cache::{BlobCache, CacheError, CacheKey, JsonCache};
use vitrine_config::GalleryConfig;
use vitrine_http::ACCEPT_JSON;

use crate::context::ProviderContext;
use crate::error::ProviderError;
use crate::provider::{ArtProvider, clear_namespaces};

/// Provider backed by the Google Arts & Culture manifest.
///
/// The whole manifest is synced at once and filtered to valid assets, so
/// indices are dense and stable after a sync.
pub struct GalleryProvider {
  ctx: ProviderContext,
  manifest_url: String,
  assets: RwLock<Vec<Arc<Asset>>>,
}

impl GalleryProvider {
  pub fn new(ctx: ProviderContext, config: &GalleryConfig) -> Self {
    Self {
      ctx,
      manifest_url: config.manifest_url.clone(),
      assets: RwLock::new(Vec::new()),
    }
  }

  async fn fetch_manifest(&self) -> Result<Vec<Asset>, ProviderError> {
    let response = self.ctx.fetcher.get(&self.manifest_url, ACCEPT_JSON).await?;
    if !response.is_success() {
      return Err(ProviderError::Status {
        url: self.manifest_url.clone(),
        status: response.status,
      });
    }

    let records: Vec<GalleryRecord> = response.json()?;
    let total = records.len();
    let assets: Vec<Asset> = records
      .into_iter()
      .filter(GalleryRecord::is_displayable)
      .map(GalleryAsset::from_api_response)
      .filter(|asset| asset.is_valid())
      .map(Asset::Gallery)
      .collect();

    debug!(
      provider = GALLERY_PROVIDER,
      total,
      valid = assets.len(),
      "filtered gallery manifest"
    );
    Ok(assets)
  }

  async fn replace(&self, assets: Vec<Asset>) {
    *self.assets.write().await = assets.into_iter().map(Arc::new).collect();
  }

  async fn ensure_synced(&self) {
    if self.assets.read().await.is_empty() {
      self.sync_data().await;
    }
  }
}

#[async_trait]
impl ArtProvider for GalleryProvider {
  fn name(&self) -> &'static str {
    GALLERY_PROVIDER
  }

  fn display_name(&self) -> &'static str {
    "Google Arts & Culture"
  }

  fn prevalidated(&self) -> bool {
    true
  }

  fn json_cache(&self) -> &JsonCache {
    &self.ctx.cache
  }

  fn blob_cache(&self) -> &BlobCache {
    &self.ctx.blobs
  }

  async fn sync_data(&self) -> bool {
    if let Some(cached) = self
      .ctx
      .cache
      .get::<Vec<Asset>>(GALLERY_PROVIDER, CacheKey::Assets)
      .await
    {
      info!(provider = GALLERY_PROVIDER, assets = cached.len(), "restored assets from cache");
      self.replace(cached).await;
      return true;
    }

    match self.fetch_manifest().await {
      Ok(assets) => {
        if let Err(e) = self
          .ctx
          .cache
          .set(GALLERY_PROVIDER, CacheKey::Assets, &assets)
          .await
        {
          warn!(provider = GALLERY_PROVIDER, error = %e, "failed to cache assets");
        }
        info!(provider = GALLERY_PROVIDER, assets = assets.len(), "synced manifest");
        self.replace(assets).await;
        true
      }
      Err(e) => {
        error!(provider = GALLERY_PROVIDER, url = %self.manifest_url, error = %e, "sync failed");
        false
      }
    }
  }

  async fn synced_asset_count(&self) -> usize {
    self.ensure_synced().await;
    self.assets.read().await.len()
  }

  async fn get_asset(&self, index: usize) -> Option<Arc<Asset>> {
    self.ensure_synced().await;

    let assets = self.assets.read().await;
    let asset = assets.get(index).cloned();
    if asset.is_none() {
      debug!(provider = GALLERY_PROVIDER, index, count = assets.len(), "asset index out of range");
    }
    asset
  }

  async fn clear_cache(&self) -> Result<(), CacheError> {
    self.assets.write().await.clear();
    clear_namespaces(self).await
  }
}
