use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use vitrine_asset::{ArtAsset, Asset, MUSEUM_PROVIDER, MuseumAsset, MuseumRecord, MuseumSearch};
use vitrine_cache::{BlobCache, CacheError, CacheKey, JsonCache, SingleFlight};
use vitrine_config::MuseumConfig;
use vitrine_http::{ACCEPT_JSON, Fetcher};

use crate::context::ProviderContext;
use crate::error::ProviderError;
use crate::provider::{ArtProvider, clear_namespaces};

const RATE_LIMITED: u16 = 403;

/// Memoized outcome for one index.
#[derive(Clone)]
enum Slot {
  Displayable(Arc<Asset>),
  Invalid,
}

/// Outcome of one object fetch.
#[derive(Clone)]
enum Lookup {
  Found(Arc<Asset>),
  Invalid,
  /// Not memoized; the index may be retried later.
  RateLimited,
  /// Not memoized; the index may be retried later.
  Unavailable,
}

/// Provider backed by the Metropolitan Museum of Art collection API.
///
/// Sync discovers candidate object IDs only. Object metadata is fetched on
/// the first lookup of each index and memoized, including negative results.
pub struct MuseumProvider {
  ctx: ProviderContext,
  config: MuseumConfig,
  ids: Arc<RwLock<Vec<u64>>>,
  slots: Arc<RwLock<HashMap<usize, Slot>>>,
  sync_flight: SingleFlight<&'static str, bool>,
  object_flight: SingleFlight<usize, Lookup>,
}

impl MuseumProvider {
  pub fn new(ctx: ProviderContext, config: &MuseumConfig) -> Self {
    Self {
      ctx,
      config: config.clone(),
      ids: Arc::new(RwLock::new(Vec::new())),
      slots: Arc::new(RwLock::new(HashMap::new())),
      sync_flight: SingleFlight::new(),
      object_flight: SingleFlight::new(),
    }
  }

  async fn ensure_synced(&self) {
    if self.ids.read().await.is_empty() {
      self.sync_data().await;
    }
  }
}

#[async_trait]
impl ArtProvider for MuseumProvider {
  fn name(&self) -> &'static str {
    MUSEUM_PROVIDER
  }

  fn display_name(&self) -> &'static str {
    "Metropolitan Museum of Art"
  }

  fn prevalidated(&self) -> bool {
    false
  }

  fn json_cache(&self) -> &JsonCache {
    &self.ctx.cache
  }

  fn blob_cache(&self) -> &BlobCache {
    &self.ctx.blobs
  }

  async fn sync_data(&self) -> bool {
    if !self.ids.read().await.is_empty() {
      return true;
    }

    let ids = self.ids.clone();
    let cache = self.ctx.cache.clone();
    let fetcher = self.ctx.fetcher.clone();
    let search_url = self.config.search_url();

    self
      .sync_flight
      .run(MUSEUM_PROVIDER, move || {
        async move { discover_ids(ids, cache, fetcher, search_url).await }.boxed()
      })
      .await
  }

  async fn synced_asset_count(&self) -> usize {
    self.ensure_synced().await;
    self.ids.read().await.len()
  }

  async fn get_asset(&self, index: usize) -> Option<Arc<Asset>> {
    self.ensure_synced().await;

    let object_id = {
      let ids = self.ids.read().await;
      match ids.get(index) {
        Some(id) => *id,
        None => {
          debug!(provider = MUSEUM_PROVIDER, index, count = ids.len(), "asset index out of range");
          return None;
        }
      }
    };

    if let Some(slot) = self.slots.read().await.get(&index) {
      return match slot {
        Slot::Displayable(asset) => Some(asset.clone()),
        Slot::Invalid => None,
      };
    }

    let slots = self.slots.clone();
    let fetcher = self.ctx.fetcher.clone();
    let url = self.config.object_url(object_id);

    let lookup = self
      .object_flight
      .run(index, move || {
        async move {
          let lookup = fetch_object(fetcher.as_ref(), &url).await;
          match &lookup {
            Lookup::Found(asset) => {
              slots
                .write()
                .await
                .insert(index, Slot::Displayable(asset.clone()));
            }
            Lookup::Invalid => {
              slots.write().await.insert(index, Slot::Invalid);
            }
            Lookup::RateLimited | Lookup::Unavailable => {}
          }
          lookup
        }
        .boxed()
      })
      .await;

    match lookup {
      Lookup::Found(asset) => Some(asset),
      Lookup::Invalid => {
        debug!(provider = MUSEUM_PROVIDER, index, object_id, "object not displayable");
        None
      }
      Lookup::RateLimited => {
        warn!(provider = MUSEUM_PROVIDER, index, object_id, "rate limited");
        None
      }
      Lookup::Unavailable => None,
    }
  }

  async fn clear_cache(&self) -> Result<(), CacheError> {
    self.ids.write().await.clear();
    self.slots.write().await.clear();
    clear_namespaces(self).await
  }
}

async fn discover_ids(
  ids: Arc<RwLock<Vec<u64>>>,
  cache: Arc<JsonCache>,
  fetcher: Arc<dyn Fetcher>,
  search_url: String,
) -> bool {
  if let Some(cached) = cache.get::<Vec<u64>>(MUSEUM_PROVIDER, CacheKey::Ids).await {
    info!(provider = MUSEUM_PROVIDER, candidates = cached.len(), "restored object ids from cache");
    *ids.write().await = cached;
    return true;
  }

  match search(fetcher.as_ref(), &search_url).await {
    Ok(found) => {
      if let Err(e) = cache.set(MUSEUM_PROVIDER, CacheKey::Ids, &found).await {
        warn!(provider = MUSEUM_PROVIDER, error = %e, "failed to cache object ids");
      }
      info!(provider = MUSEUM_PROVIDER, candidates = found.len(), "synced object ids");
      *ids.write().await = found;
      true
    }
    Err(e) => {
      error!(provider = MUSEUM_PROVIDER, url = %search_url, error = %e, "sync failed");
      false
    }
  }
}

async fn search(fetcher: &dyn Fetcher, url: &str) -> Result<Vec<u64>, ProviderError> {
  let response = fetcher.get(url, ACCEPT_JSON).await?;
  if !response.is_success() {
    return Err(ProviderError::Status {
      url: url.to_string(),
      status: response.status,
    });
  }

  let search: MuseumSearch = response.json()?;
  Ok(search.object_ids.unwrap_or_default())
}

async fn fetch_object(fetcher: &dyn Fetcher, url: &str) -> Lookup {
  let response = match fetcher.get(url, ACCEPT_JSON).await {
    Ok(response) => response,
    Err(e) => {
      warn!(provider = MUSEUM_PROVIDER, url, error = %e, "object fetch failed");
      return Lookup::Unavailable;
    }
  };

  if response.status == RATE_LIMITED {
    return Lookup::RateLimited;
  }
  if !response.is_success() {
    debug!(provider = MUSEUM_PROVIDER, url, status = response.status, "object fetch rejected");
    return Lookup::Invalid;
  }

  let record: MuseumRecord = match response.json() {
    Ok(record) => record,
    Err(e) => {
      debug!(provider = MUSEUM_PROVIDER, url, error = %e, "malformed object record");
      return Lookup::Invalid;
    }
  };

  if !record.is_valid_for_display() {
    return Lookup::Invalid;
  }

  let asset = Asset::Museum(MuseumAsset::from_api_response(record));
  if asset.is_valid() {
    Lookup::Found(Arc::new(asset))
  } else {
    Lookup::Invalid
  }
}
