//! Vitrine Cache
//!
//! Two caches sit between the providers and the network:
//!
//! - [`JsonCache`] is a cache-aside layer for provider metadata over the
//!   durable [`KvStore`](vitrine_store::KvStore). Every key in a namespace
//!   shares one timestamp, so a namespace expires as a unit.
//! - [`BlobCache`] holds raw image responses in a per-provider blob
//!   namespace and turns them into `data:` URLs for display. Concurrent
//!   loads of the same image share one fetch.

mod blob_cache;
mod clock;
mod error;
mod json_cache;
mod single_flight;

pub use blob_cache::{BlobCache, image_namespace, normalize_key};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CacheError;
pub use json_cache::{CacheKey, DEFAULT_TTL_MS, JsonCache};
pub use single_flight::SingleFlight;
