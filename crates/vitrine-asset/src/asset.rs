use serde::{Deserialize, Serialize};
use vitrine_cache::{BlobCache, image_namespace};

use crate::error::AssetError;
use crate::gallery::{GALLERY_PROVIDER, GalleryAsset};
use crate::museum::{MUSEUM_PROVIDER, MuseumAsset};

/// Title used when the source has none.
pub const UNTITLED: &str = "Untitled";

/// Creator used when the source names nobody.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Behavior shared by every asset variant.
pub trait ArtAsset {
  fn id(&self) -> &str;
  fn title(&self) -> &str;
  fn creator(&self) -> &str;
  fn attribution(&self) -> &str;
  fn remote_image_url(&self) -> &str;

  /// Name of the provider this asset came from.
  fn provider(&self) -> &'static str;

  /// The URL the full-resolution image is fetched from. Empty when the
  /// asset has no image.
  fn processed_image_url(&self) -> String;

  /// Absolute URL of the asset's public page.
  fn details_url(&self) -> String;

  /// An asset is displayable only with an image and a title.
  fn is_valid(&self) -> bool {
    !self.remote_image_url().is_empty() && !self.title().is_empty()
  }
}

/// An asset from any provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum Asset {
  #[serde(rename = "google-arts")]
  Gallery(GalleryAsset),
  #[serde(rename = "met-museum")]
  Museum(MuseumAsset),
}

impl Asset {
  fn inner(&self) -> &dyn ArtAsset {
    match self {
      Asset::Gallery(asset) => asset,
      Asset::Museum(asset) => asset,
    }
  }

  pub fn to_json(&self) -> Result<String, AssetError> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn from_json(json: &str) -> Result<Self, AssetError> {
    Ok(serde_json::from_str(json)?)
  }

  /// URL to show the image with.
  ///
  /// A cached image comes back as a `data:` URL, otherwise the remote
  /// processed URL is returned. Never fetches. `None` when the asset has no
  /// image at all.
  pub async fn display_image_url(&self, blobs: &BlobCache) -> Option<String> {
    let processed = self.processed_image_url();
    if processed.is_empty() {
      return None;
    }

    let namespace = image_namespace(self.provider());
    match blobs.cached_data_url(&namespace, &processed).await {
      Some(data_url) => Some(data_url),
      None => Some(processed),
    }
  }
}

impl ArtAsset for Asset {
  fn id(&self) -> &str {
    self.inner().id()
  }

  fn title(&self) -> &str {
    self.inner().title()
  }

  fn creator(&self) -> &str {
    self.inner().creator()
  }

  fn attribution(&self) -> &str {
    self.inner().attribution()
  }

  fn remote_image_url(&self) -> &str {
    self.inner().remote_image_url()
  }

  fn provider(&self) -> &'static str {
    match self {
      Asset::Gallery(_) => GALLERY_PROVIDER,
      Asset::Museum(_) => MUSEUM_PROVIDER,
    }
  }

  fn processed_image_url(&self) -> String {
    self.inner().processed_image_url()
  }

  fn details_url(&self) -> String {
    self.inner().details_url()
  }
}

impl From<GalleryAsset> for Asset {
  fn from(asset: GalleryAsset) -> Self {
    Asset::Gallery(asset)
  }
}

impl From<MuseumAsset> for Asset {
  fn from(asset: MuseumAsset) -> Self {
    Asset::Museum(asset)
  }
}

/// `Some` only for non-empty strings.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

pub(crate) fn generated_id() -> String {
  uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gallery::GalleryRecord;
  use crate::museum::MuseumRecord;
  use std::sync::Arc;
  use vitrine_store::InMemoryBlobStore;
  use vitrine_test_utils::{Route, ScriptedFetcher, gallery_record, museum_object};

  fn gallery_asset() -> Asset {
    let record: GalleryRecord = serde_json::from_value(gallery_record("g1", "Starry Night")).unwrap();
    GalleryAsset::from_api_response(record).into()
  }

  fn museum_asset() -> Asset {
    let record: MuseumRecord =
      serde_json::from_value(museum_object(20, "Wheat Field", true, true)).unwrap();
    MuseumAsset::from_api_response(record).into()
  }

  fn assert_equivalent(a: &Asset, b: &Asset) {
    assert_eq!(a.processed_image_url(), b.processed_image_url());
    assert_eq!(a.details_url(), b.details_url());
    assert_eq!(a.title(), b.title());
    assert_eq!(a.creator(), b.creator());
    assert_eq!(a.attribution(), b.attribution());
  }

  #[test]
  fn test_json_round_trip_preserves_behavior() {
    for asset in [gallery_asset(), museum_asset()] {
      let restored = Asset::from_json(&asset.to_json().unwrap()).unwrap();
      assert_equivalent(&asset, &restored);
      assert_eq!(restored.provider(), asset.provider());
      assert_eq!(restored, asset);
    }
  }

  #[test]
  fn test_serialized_shape() {
    let value = serde_json::to_value(gallery_asset()).unwrap();
    assert_eq!(value["provider"], "google-arts");
    assert_eq!(value["id"], "g1");
    assert!(value["remoteImageUrl"].is_string());
    assert!(value["detailsUrl"].is_string());
  }

  #[test]
  fn test_unknown_provider_tag_is_rejected() {
    let json = r#"{"provider":"louvre","id":"1","title":"t","creator":"c","attribution":"","remoteImageUrl":"u","detailsUrl":"d"}"#;
    assert!(Asset::from_json(json).is_err());
  }

  #[tokio::test]
  async fn test_display_image_url_prefers_cache() {
    let asset = gallery_asset();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.route(asset.processed_image_url(), Route::image(b"png"));
    let blobs = BlobCache::new(Arc::new(InMemoryBlobStore::new()), fetcher.clone());

    assert_eq!(
      asset.display_image_url(&blobs).await,
      Some(asset.processed_image_url())
    );
    assert_eq!(fetcher.total_fetches(), 0);

    blobs
      .load_and_cache("google-arts-images", &asset.processed_image_url())
      .await
      .unwrap();
    let display = asset.display_image_url(&blobs).await.unwrap();
    assert!(display.starts_with("data:image/jpeg;base64,"));
  }

  #[tokio::test]
  async fn test_display_image_url_without_image() {
    let record: MuseumRecord =
      serde_json::from_value(museum_object(10, "Sketch", false, true)).unwrap();
    let asset: Asset = MuseumAsset::from_api_response(record).into();
    let blobs = BlobCache::new(
      Arc::new(InMemoryBlobStore::new()),
      Arc::new(ScriptedFetcher::new()),
    );

    assert!(!asset.is_valid());
    assert_eq!(asset.display_image_url(&blobs).await, None);
  }
}
