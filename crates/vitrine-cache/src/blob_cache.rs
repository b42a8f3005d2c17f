use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use tracing::{debug, warn};
use url::Url;
use vitrine_http::{ACCEPT_IMAGE, Fetcher};
use vitrine_store::{BlobStore, Namespace, StoredResponse};

use crate::error::CacheError;
use crate::single_flight::SingleFlight;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Blob namespace holding a provider's images.
pub fn image_namespace(provider: &str) -> String {
  format!("{}-images", provider)
}

/// The key an image URL is stored under: query string and fragment are
/// dropped, scheme and host are canonicalized. Unparseable input is used
/// as-is.
pub fn normalize_key(url: &str) -> String {
  match Url::parse(url) {
    Ok(mut parsed) => {
      parsed.set_query(None);
      parsed.set_fragment(None);
      parsed.to_string()
    }
    Err(_) => url.to_string(),
  }
}

/// Image cache over a [`BlobStore`].
///
/// The only component that fetches image bytes. Entries are never
/// invalidated individually, only by deleting the whole namespace.
pub struct BlobCache {
  store: Arc<dyn BlobStore>,
  fetcher: Arc<dyn Fetcher>,
  flights: SingleFlight<(String, String), Result<String, CacheError>>,
}

impl BlobCache {
  pub fn new(store: Arc<dyn BlobStore>, fetcher: Arc<dyn Fetcher>) -> Self {
    Self {
      store,
      fetcher,
      flights: SingleFlight::new(),
    }
  }

  /// Look up the cached response for `url`.
  pub async fn get(&self, namespace: &str, url: &str) -> Result<Option<StoredResponse>, CacheError> {
    Ok(self.open(namespace).find(&normalize_key(url)).await?)
  }

  /// Store a response for `url`.
  pub async fn put(
    &self,
    namespace: &str,
    url: &str,
    response: StoredResponse,
  ) -> Result<(), CacheError> {
    Ok(self.open(namespace).put(&normalize_key(url), response).await?)
  }

  /// Delete every cached image in `namespace`. Returns whether it existed.
  pub async fn clear_namespace(&self, namespace: &str) -> Result<bool, CacheError> {
    Ok(self.open(namespace).delete().await?)
  }

  /// A `data:` URL for `url` if it is cached. Never fetches.
  pub async fn cached_data_url(&self, namespace: &str, url: &str) -> Option<String> {
    match self.get(namespace, url).await {
      Ok(hit) => hit.map(|response| data_url(&response)),
      Err(e) => {
        warn!(namespace, url, error = %e, "blob cache read failed, treating as miss");
        None
      }
    }
  }

  /// Return `url` as a `data:` URL, fetching and storing it on a miss.
  ///
  /// Concurrent calls for the same image share one fetch. A non-2xx
  /// response is an error and nothing is stored.
  pub async fn load_and_cache(&self, namespace: &str, url: &str) -> Result<String, CacheError> {
    let key = normalize_key(url);
    let namespace_handle = self.open(namespace);
    let fetcher = self.fetcher.clone();
    let url = url.to_string();

    self
      .flights
      .run((namespace.to_string(), key.clone()), move || {
        async move { load(namespace_handle, fetcher, url, key).await }.boxed()
      })
      .await
  }

  fn open(&self, namespace: &str) -> Namespace {
    Namespace::open(self.store.clone(), namespace)
  }
}

async fn load(
  namespace: Namespace,
  fetcher: Arc<dyn Fetcher>,
  url: String,
  key: String,
) -> Result<String, CacheError> {
  if let Some(hit) = namespace.find(&key).await? {
    debug!(namespace = namespace.name(), url = %url, "image cache hit");
    return Ok(data_url(&hit));
  }

  debug!(namespace = namespace.name(), url = %url, "image cache miss, fetching");
  let response = fetcher
    .get(&url, ACCEPT_IMAGE)
    .await
    .map_err(|e| CacheError::Fetch {
      url: url.clone(),
      message: e.to_string(),
    })?;

  if !response.is_success() {
    return Err(CacheError::Status {
      url,
      status: response.status,
    });
  }

  let stored = StoredResponse::new(
    response.status,
    response.headers,
    response.body,
  );
  namespace.put(&key, stored.clone()).await?;

  Ok(data_url(&stored))
}

fn data_url(response: &StoredResponse) -> String {
  let content_type = response.content_type().unwrap_or(FALLBACK_CONTENT_TYPE);
  format!(
    "data:{};base64,{}",
    content_type,
    STANDARD.encode(&response.body)
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;
  use vitrine_store::{FsBlobStore, InMemoryBlobStore};
  use vitrine_test_utils::{Route, ScriptedFetcher};

  const IMAGE: &str = "https://images.test/a.jpg";

  fn setup(fetcher: ScriptedFetcher) -> (BlobCache, Arc<InMemoryBlobStore>, Arc<ScriptedFetcher>) {
    let store = Arc::new(InMemoryBlobStore::new());
    let fetcher = Arc::new(fetcher);
    let cache = BlobCache::new(store.clone(), fetcher.clone());
    (cache, store, fetcher)
  }

  #[test]
  fn test_normalize_key_drops_query_and_fragment() {
    assert_eq!(
      normalize_key("HTTPS://Images.Test/a.jpg?w=100#top"),
      "https://images.test/a.jpg"
    );
    assert_eq!(normalize_key("not a url"), "not a url");
  }

  #[test]
  fn test_image_namespace() {
    assert_eq!(image_namespace("met-museum"), "met-museum-images");
  }

  #[tokio::test]
  async fn test_load_and_cache_fetches_once() {
    let fetcher = ScriptedFetcher::new();
    fetcher.route(IMAGE, Route::image(b"jpeg"));
    let (cache, store, fetcher) = setup(fetcher);

    let first = cache.load_and_cache("gallery-images", IMAGE).await.unwrap();
    let second = cache.load_and_cache("gallery-images", IMAGE).await.unwrap();

    assert_eq!(first, format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpeg")));
    assert_eq!(first, second);
    assert_eq!(fetcher.fetch_count(IMAGE), 1);
    assert_eq!(store.entry_count("gallery-images").await, 1);
  }

  #[tokio::test]
  async fn test_concurrent_loads_share_one_fetch() {
    let fetcher = ScriptedFetcher::new().with_latency(Duration::from_millis(30));
    fetcher.route(IMAGE, Route::image(b"jpeg"));
    let (cache, _, fetcher) = setup(fetcher);

    let (a, b) = tokio::join!(
      cache.load_and_cache("gallery-images", IMAGE),
      cache.load_and_cache("gallery-images", IMAGE),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(fetcher.fetch_count(IMAGE), 1);
  }

  #[tokio::test]
  async fn test_corrupt_entry_on_disk_is_refetched_and_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.route(IMAGE, Route::image(b"jpeg"));
    let cache = BlobCache::new(Arc::new(FsBlobStore::new(dir.path())), fetcher.clone());

    let first = cache.load_and_cache("gallery-images", IMAGE).await.unwrap();

    for entry in std::fs::read_dir(dir.path().join("gallery-images")).unwrap() {
      let path = entry.unwrap().path();
      if path.extension().is_some_and(|ext| ext == "json") {
        std::fs::write(&path, r#"{"key":"#).unwrap();
      }
    }

    let second = cache.load_and_cache("gallery-images", IMAGE).await.unwrap();
    let third = cache.load_and_cache("gallery-images", IMAGE).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(fetcher.fetch_count(IMAGE), 2);
  }

  #[tokio::test]
  async fn test_non_success_is_error_and_not_stored() {
    let fetcher = ScriptedFetcher::new();
    fetcher.route(IMAGE, Route::status(500));
    let (cache, store, _) = setup(fetcher);

    let err = cache.load_and_cache("gallery-images", IMAGE).await.unwrap_err();
    assert!(matches!(err, CacheError::Status { status: 500, .. }));
    assert_eq!(store.entry_count("gallery-images").await, 0);
  }

  #[tokio::test]
  async fn test_lookup_ignores_query() {
    let fetcher = ScriptedFetcher::new();
    fetcher.route(IMAGE, Route::image(b"jpeg"));
    let (cache, _, fetcher) = setup(fetcher);

    cache.load_and_cache("gallery-images", IMAGE).await.unwrap();

    let equivalent = format!("{}?cache-bust=1", IMAGE);
    assert!(cache.cached_data_url("gallery-images", &equivalent).await.is_some());
    cache.load_and_cache("gallery-images", &equivalent).await.unwrap();
    assert_eq!(fetcher.total_fetches(), 1);
  }

  #[tokio::test]
  async fn test_cached_data_url_never_fetches() {
    let fetcher = ScriptedFetcher::new();
    fetcher.route(IMAGE, Route::image(b"jpeg"));
    let (cache, _, fetcher) = setup(fetcher);

    assert_eq!(cache.cached_data_url("gallery-images", IMAGE).await, None);
    assert_eq!(fetcher.total_fetches(), 0);
  }

  #[tokio::test]
  async fn test_clear_namespace_is_isolated() {
    let fetcher = ScriptedFetcher::new();
    fetcher.route(IMAGE, Route::image(b"jpeg"));
    let (cache, store, _) = setup(fetcher);

    cache.load_and_cache("gallery-images", IMAGE).await.unwrap();
    cache.load_and_cache("museum-images", IMAGE).await.unwrap();

    assert!(cache.clear_namespace("museum-images").await.unwrap());
    assert!(!cache.clear_namespace("museum-images").await.unwrap());
    assert_eq!(store.entry_count("gallery-images").await, 1);
    assert_eq!(store.entry_count("museum-images").await, 0);
  }
}
