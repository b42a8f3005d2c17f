use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use vitrine_asset::{ArtAsset, Asset};
use vitrine_cache::{BlobCache, CacheError, JsonCache, image_namespace};

/// The capability set every provider implements.
#[async_trait]
pub trait ArtProvider: Send + Sync {
  /// Unique registry key. Also the provider's cache namespace.
  fn name(&self) -> &'static str;

  /// Human-readable name.
  fn display_name(&self) -> &'static str;

  /// Whether every index below [`synced_asset_count`](Self::synced_asset_count)
  /// is known to be displayable once synced.
  fn prevalidated(&self) -> bool;

  fn json_cache(&self) -> &JsonCache;

  fn blob_cache(&self) -> &BlobCache;

  /// Acquire (or restore from cache) the provider's metadata.
  async fn sync_data(&self) -> bool;

  /// Number of synced assets. For lazily validated providers this counts
  /// candidates, not confirmed-displayable assets.
  async fn synced_asset_count(&self) -> usize;

  /// The asset at `index`, or `None` when out of range or not displayable.
  async fn get_asset(&self, index: usize) -> Option<Arc<Asset>>;

  /// Drop cached metadata and images, in memory and on disk.
  async fn clear_cache(&self) -> Result<(), CacheError>;

  /// Make sure the image for `index` is in the blob cache. Already cached
  /// images are not fetched again.
  async fn load_image(&self, index: usize) -> bool {
    let Some(asset) = self.get_asset(index).await else {
      return false;
    };

    let url = asset.processed_image_url();
    if url.is_empty() {
      return false;
    }

    match self
      .blob_cache()
      .load_and_cache(&image_namespace(self.name()), &url)
      .await
    {
      Ok(_) => true,
      Err(e) => {
        warn!(provider = self.name(), index, error = %e, "failed to load image");
        false
      }
    }
  }

  /// URL to display the image at `index` with. Never fetches.
  async fn display_image_url(&self, index: usize) -> Option<String> {
    let asset = self.get_asset(index).await?;
    asset.display_image_url(self.blob_cache()).await
  }

  fn details_url(&self, asset: &Asset) -> String {
    asset.details_url()
  }
}

/// Clear a provider's JSON namespace and its image namespace.
pub(crate) async fn clear_namespaces(provider: &dyn ArtProvider) -> Result<(), CacheError> {
  provider.json_cache().clear(provider.name()).await?;
  provider
    .blob_cache()
    .clear_namespace(&image_namespace(provider.name()))
    .await?;
  Ok(())
}
