use std::sync::Arc;

use vitrine_cache::{BlobCache, JsonCache, ManualClock};
use vitrine_store::{InMemoryBlobStore, InMemoryKvStore};
use vitrine_test_utils::ScriptedFetcher;

use crate::context::ProviderContext;

pub(crate) const T0: i64 = 1_700_000_000_000;

pub(crate) struct Harness {
  pub fetcher: Arc<ScriptedFetcher>,
  pub kv: Arc<InMemoryKvStore>,
  pub blobs: Arc<InMemoryBlobStore>,
  pub clock: Arc<ManualClock>,
}

impl Harness {
  pub fn new(fetcher: ScriptedFetcher) -> Self {
    Self {
      fetcher: Arc::new(fetcher),
      kv: Arc::new(InMemoryKvStore::new()),
      blobs: Arc::new(InMemoryBlobStore::new()),
      clock: Arc::new(ManualClock::new(T0)),
    }
  }

  /// A fresh context over the same stores, as after a restart.
  pub fn context(&self) -> ProviderContext {
    ProviderContext::new(
      self.fetcher.clone(),
      JsonCache::with_clock(self.kv.clone(), self.clock.clone()),
      BlobCache::new(self.blobs.clone(), self.fetcher.clone()),
    )
  }
}
