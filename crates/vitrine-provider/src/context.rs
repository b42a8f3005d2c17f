use std::sync::Arc;

use vitrine_cache::{BlobCache, JsonCache};
use vitrine_http::Fetcher;

/// Collaborators every provider is built from.
#[derive(Clone)]
pub struct ProviderContext {
  pub fetcher: Arc<dyn Fetcher>,
  pub cache: Arc<JsonCache>,
  pub blobs: Arc<BlobCache>,
}

impl ProviderContext {
  pub fn new(fetcher: Arc<dyn Fetcher>, cache: JsonCache, blobs: BlobCache) -> Self {
    Self {
      fetcher,
      cache: Arc::new(cache),
      blobs: Arc::new(blobs),
    }
  }
}
