use serde::{Deserialize, Serialize};

use crate::asset::{ArtAsset, UNKNOWN_ARTIST, UNTITLED, generated_id, present};

pub const MUSEUM_PROVIDER: &str = "met-museum";

/// Response of the museum search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MuseumSearch {
  #[serde(default)]
  pub total: u64,
  /// `null` when the search matched nothing.
  #[serde(rename = "objectIDs", default)]
  pub object_ids: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
  #[serde(default)]
  pub name: Option<String>,
}

/// One object record from the museum API, as served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MuseumRecord {
  #[serde(rename = "objectID")]
  pub object_id: Option<u64>,
  pub title: Option<String>,
  pub artist_display_name: Option<String>,
  pub constituents: Option<Vec<Constituent>>,
  pub culture: Option<String>,
  pub period: Option<String>,
  pub dynasty: Option<String>,
  pub reign: Option<String>,
  pub credit_line: Option<String>,
  pub primary_image: Option<String>,
  #[serde(rename = "objectURL")]
  pub object_url: Option<String>,
  pub is_public_domain: Option<bool>,
}

impl MuseumRecord {
  /// Raw-level filter: a public-domain record with a primary image.
  pub fn is_valid_for_display(&self) -> bool {
    self
      .primary_image
      .as_deref()
      .is_some_and(|image| !image.trim().is_empty())
      && self.is_public_domain == Some(true)
  }

  fn creator(&self) -> &str {
    present(&self.artist_display_name)
      .or_else(|| {
        self
          .constituents
          .as_ref()
          .and_then(|c| c.first())
          .and_then(|c| present(&c.name))
      })
      .unwrap_or(UNKNOWN_ARTIST)
  }

  fn attribution(&self) -> String {
    let parts: Vec<&str> = [&self.culture, &self.period, &self.dynasty, &self.reign]
      .into_iter()
      .filter_map(present)
      .collect();

    if parts.is_empty() {
      present(&self.credit_line).unwrap_or_default().to_string()
    } else {
      parts.join(", ")
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuseumAsset {
  pub id: String,
  pub title: String,
  pub creator: String,
  pub attribution: String,
  pub remote_image_url: String,
  /// Absolute URL of the object page.
  pub details_url: String,
}

impl MuseumAsset {
  pub fn from_api_response(record: MuseumRecord) -> Self {
    Self {
      id: record
        .object_id
        .map_or_else(generated_id, |id| id.to_string()),
      title: present(&record.title).unwrap_or(UNTITLED).to_string(),
      creator: record.creator().to_string(),
      attribution: record.attribution(),
      remote_image_url: present(&record.primary_image)
        .unwrap_or_default()
        .to_string(),
      details_url: present(&record.object_url).unwrap_or_default().to_string(),
    }
  }
}

impl ArtAsset for MuseumAsset {
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
    MUSEUM_PROVIDER
  }

  // Museum images are already full resolution.
  fn processed_image_url(&self) -> String {
    self.remote_image_url.clone()
  }

  fn details_url(&self) -> String {
    self.details_url.clone()
  }
}
