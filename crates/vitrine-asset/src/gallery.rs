use serde::{Deserialize, Serialize};

use crate::asset::{ArtAsset, UNKNOWN_ARTIST, UNTITLED, generated_id, present};

pub const GALLERY_PROVIDER: &str = "google-arts";

/// Size/quality suffix appended to gallery image URLs.
const IMAGE_SUFFIX: &str = "=s1920-rw";

const DETAILS_PREFIX: &str = "https://artsandculture.google.com/asset/";

/// One record of the gallery manifest, as served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryRecord {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub creator: Option<String>,
  #[serde(default)]
  pub attribution: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub link: Option<String>,
}

impl GalleryRecord {
  /// Raw-level filter: a record needs an image and a title.
  pub fn is_displayable(&self) -> bool {
    present(&self.image).is_some() && present(&self.title).is_some()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryAsset {
  pub id: String,
  pub title: String,
  pub creator: String,
  pub attribution: String,
  pub remote_image_url: String,
  /// Path fragment under the public asset page.
  pub details_url: String,
}

impl GalleryAsset {
  pub fn from_api_response(record: GalleryRecord) -> Self {
    Self {
      id: present(&record.id).map_or_else(generated_id, str::to_string),
      title: present(&record.title).unwrap_or(UNTITLED).to_string(),
      creator: present(&record.creator).unwrap_or(UNKNOWN_ARTIST).to_string(),
      attribution: present(&record.attribution).unwrap_or_default().to_string(),
      remote_image_url: present(&record.image).unwrap_or_default().to_string(),
      details_url: present(&record.link).unwrap_or_default().to_string(),
    }
  }
}

impl ArtAsset for GalleryAsset {
  fn id(&self) -> &str {
    &self.id
  }

  fn title(&self) -> &str {
    &self.title
  }

  fn creator(&self) -> &str {
    &self.creator
  }

  fn attribution(&self) -> &str {
    &self.attribution
  }

  fn remote_image_url(&self) -> &str {
    &self.remote_image_url
  }

  fn provider(&self) -> &'static str {
    GALLERY_PROVIDER
  }

  fn processed_image_url(&self) -> String {
    if self.remote_image_url.is_empty() {
      return String::new();
    }
    format!("{}{}", self.remote_image_url, IMAGE_SUFFIX)
  }

  fn details_url(&self) -> String {
    format!("{}{}", DETAILS_PREFIX, self.details_url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(json: serde_json::Value) -> GalleryRecord {
    serde_json::from_value(json).unwrap()
  }

  #[test]
  fn test_from_api_response() {
    let asset = GalleryAsset::from_api_response(record(serde_json::json!({
      "id": "abc",
      "title": "The Harvest",
      "creator": "Bruegel",
      "image": "https://lh3.example/xyz",
      "link": "the-harvest/abc",
    })));

    assert_eq!(asset.id, "abc");
    assert_eq!(asset.attribution, "");
    assert_eq!(asset.processed_image_url(), "https://lh3.example/xyz=s1920-rw");
    assert_eq!(
      asset.details_url(),
      "https://artsandculture.google.com/asset/the-harvest/abc"
    );
    assert!(asset.is_valid());
  }

  #[test]
  fn test_placeholders_and_generated_id() {
    let asset = GalleryAsset::from_api_response(record(serde_json::json!({ "title": "" })));

    assert_eq!(asset.title, UNTITLED);
    assert_eq!(asset.creator, UNKNOWN_ARTIST);
    assert_eq!(asset.id.len(), 32);
    assert_eq!(asset.processed_image_url(), "");
    assert!(!asset.is_valid());
  }

  #[test]
  fn test_raw_filter() {
    assert!(record(serde_json::json!({ "title": "t", "image": "i" })).is_displayable());
    assert!(!record(serde_json::json!({ "title": "t" })).is_displayable());
    assert!(!record(serde_json::json!({ "title": "", "image": "i" })).is_displayable());
  }
}
