use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Google Arts & Culture tab-extension manifest.
const GALLERY_MANIFEST_URL: &str = "https://www.gstatic.com/culturalinstitute/tabext/imax_2_2.json";

/// Metropolitan Museum of Art collection API.
const MUSEUM_BASE_URL: &str = "https://collectionapi.metmuseum.org/public/collection/v1";

const MUSEUM_SEARCH_QUERY: &str = "hasImages=true&isHighlight=true&q=painting";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitrineConfig {
  pub gallery: GalleryConfig,
  pub museum: MuseumConfig,
  pub cache: CacheConfig,
  pub rotation: RotationConfig,
  pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
  /// Static JSON manifest listing every gallery asset.
  pub manifest_url: String,
}

impl Default for GalleryConfig {
  fn default() -> Self {
    Self {
      manifest_url: GALLERY_MANIFEST_URL.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuseumConfig {
  /// API base; `/search` and `/objects/{id}` hang off it.
  pub base_url: String,
  /// Query string for candidate discovery, without the leading `?`.
  pub search_query: String,
}

impl Default for MuseumConfig {
  fn default() -> Self {
    Self {
      base_url: MUSEUM_BASE_URL.to_string(),
      search_query: MUSEUM_SEARCH_QUERY.to_string(),
    }
  }
}

impl MuseumConfig {
  pub fn search_url(&self) -> String {
    format!(
      "{}/search?{}",
      self.base_url.trim_end_matches('/'),
      self.search_query
    )
  }

  pub fn object_url(&self, object_id: u64) -> String {
    format!("{}/objects/{}", self.base_url.trim_end_matches('/'), object_id)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Lifetime of cached provider metadata.
  pub ttl_hours: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { ttl_hours: 24 }
  }
}

impl CacheConfig {
  pub fn ttl(&self) -> Duration {
    Duration::from_secs(self.ttl_hours.saturating_mul(60 * 60))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
  /// How many indices a rotation probes before giving up.
  pub max_attempts: usize,
}

impl Default for RotationConfig {
  fn default() -> Self {
    Self { max_attempts: 10 }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
  pub timeout_secs: u64,
  pub user_agent: String,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      timeout_secs: 30,
      user_agent: concat!("vitrine/", env!("CARGO_PKG_VERSION")).to_string(),
    }
  }
}

impl HttpConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl VitrineConfig {
  /// Parse configuration from a JSON string.
  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }

  /// Load configuration from `path`. A missing file yields the defaults.
  pub async fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
      Err(source) => {
        return Err(ConfigError::Io {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    Self::from_json(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Default data directory (`~/.vitrine`).
pub fn default_data_dir() -> Option<PathBuf> {
  dirs::home_dir().map(|home| home.join(".vitrine"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_config_keeps_defaults() {
    let config = VitrineConfig::from_json(r#"{"rotation": {"max_attempts": 3}}"#).unwrap();

    assert_eq!(config.rotation.max_attempts, 3);
    assert_eq!(config.cache.ttl_hours, 24);
    assert_eq!(config.gallery.manifest_url, GALLERY_MANIFEST_URL);
    assert_eq!(config.museum.search_query, MUSEUM_SEARCH_QUERY);
  }

  #[test]
  fn test_cache_ttl_saturates_on_huge_hours() {
    assert_eq!(CacheConfig::default().ttl(), Duration::from_secs(24 * 60 * 60));

    let config = VitrineConfig::from_json(r#"{"cache": {"ttl_hours": 18446744073709551615}}"#).unwrap();
    assert_eq!(config.cache.ttl(), Duration::from_secs(u64::MAX));
  }

  #[test]
  fn test_museum_urls() {
    let museum = MuseumConfig {
      base_url: "https://museum.test/v1/".to_string(),
      search_query: "q=painting".to_string(),
    };

    assert_eq!(museum.search_url(), "https://museum.test/v1/search?q=painting");
    assert_eq!(museum.object_url(42), "https://museum.test/v1/objects/42");
  }

  #[test]
  fn test_cache_ttl() {
    assert_eq!(CacheConfig::default().ttl(), Duration::from_secs(86_400));
  }

  #[tokio::test]
  async fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = VitrineConfig::load(&dir.path().join("config.json"))
      .await
      .unwrap();
    assert_eq!(config, VitrineConfig::default());
  }

  #[tokio::test]
  async fn test_load_malformed_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    tokio::fs::write(&path, "{\"cache\": ").await.unwrap();

    let err = VitrineConfig::load(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
