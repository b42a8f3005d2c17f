#![allow(dead_code)]

use std::sync::Arc;

use vitrine_cache::{BlobCache, JsonCache};
use vitrine_coordinator::{BackgroundCoordinator, ChannelBroadcaster};
use vitrine_manager::ArtManager;
use vitrine_provider::{ProviderContext, ProviderRegistry};
use vitrine_store::{InMemoryBlobStore, InMemoryKvStore};
use vitrine_test_utils::{
  GALLERY_MANIFEST_URL, Route, ScriptedFetcher, gallery_image_url, gallery_record,
  museum_image_url, museum_object, museum_object_url, museum_search, museum_search_url,
  test_config,
};

pub const GALLERY_IDS: [&str; 3] = ["a", "b", "c"];

/// Museum candidates; object 10 has no image.
pub const MUSEUM_IDS: [u64; 3] = [10, 20, 30];

/// Gallery image URL as fetched (with the size suffix).
pub fn gallery_fetch_url(id: &str) -> String {
  format!("{}=s1920-rw", gallery_image_url(id))
}

/// Gallery manifest with three records and museum objects `[10, 20, 30]`,
/// every image routed.
pub fn scripted() -> ScriptedFetcher {
  let fetcher = ScriptedFetcher::new();
  let records: Vec<_> = GALLERY_IDS
    .iter()
    .map(|id| gallery_record(id, &format!("Gallery {id}")))
    .collect();
  fetcher.route(GALLERY_MANIFEST_URL, Route::json(&serde_json::json!(records)));
  for id in GALLERY_IDS {
    fetcher.route(gallery_fetch_url(id), Route::image(id.as_bytes()));
  }

  fetcher.route(museum_search_url(), Route::json(&museum_search(&MUSEUM_IDS)));
  fetcher.route(
    museum_object_url(10),
    Route::json(&museum_object(10, "Sketch", false, true)),
  );
  for id in [20, 30] {
    fetcher.route(
      museum_object_url(id),
      Route::json(&museum_object(id, &format!("Object {id}"), true, true)),
    );
    fetcher.route(museum_image_url(id), Route::image(b"jpeg"));
  }
  fetcher
}

/// Shared stores and fetcher. Every `coordinator()` call is a fresh process
/// over the same durable state.
pub struct Harness {
  pub fetcher: Arc<ScriptedFetcher>,
  pub kv: Arc<InMemoryKvStore>,
  pub blobs: Arc<InMemoryBlobStore>,
  pub broadcaster: ChannelBroadcaster,
}

impl Harness {
  pub fn new(fetcher: ScriptedFetcher) -> Self {
    Self {
      fetcher: Arc::new(fetcher),
      kv: Arc::new(InMemoryKvStore::new()),
      blobs: Arc::new(InMemoryBlobStore::new()),
      broadcaster: ChannelBroadcaster::new(32),
    }
  }

  pub async fn manager(&self) -> Arc<ArtManager> {
    let ctx = ProviderContext::new(
      self.fetcher.clone(),
      JsonCache::new(self.kv.clone()),
      BlobCache::new(self.blobs.clone(), self.fetcher.clone()),
    );
    let registry = ProviderRegistry::from_config(ctx, &test_config());
    Arc::new(ArtManager::load(registry, self.kv.clone()).await.unwrap())
  }

  pub async fn coordinator(&self) -> BackgroundCoordinator {
    BackgroundCoordinator::new(self.manager().await, Arc::new(self.broadcaster.clone()))
  }
}
