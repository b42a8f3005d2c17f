//! Vitrine configuration.
//!
//! A single JSON document, every section optional:
//!
//! ```json
//! {
//!   "gallery": { "manifest_url": "https://…/imax_2_2.json" },
//!   "museum": { "base_url": "https://…/v1", "search_query": "hasImages=true&q=painting" },
//!   "cache": { "ttl_hours": 24 },
//!   "rotation": { "max_attempts": 10 },
//!   "http": { "timeout_secs": 30, "user_agent": "vitrine" }
//! }
//! ```
//!
//! Endpoints are read once when providers are constructed and are never
//! changed while the process runs.

mod config;
mod error;

pub use config::{
  CacheConfig, GalleryConfig, HttpConfig, MuseumConfig, RotationConfig, VitrineConfig,
  default_data_dir,
};
pub use error::ConfigError;
