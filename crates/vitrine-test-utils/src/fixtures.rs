use serde_json::{Value, json};
use vitrine_config::{GalleryConfig, MuseumConfig, VitrineConfig};

/// Manifest URL used by gallery fixtures.
pub const GALLERY_MANIFEST_URL: &str = "https://gallery.test/manifest.json";

/// Museum API base used by museum fixtures.
pub const MUSEUM_BASE_URL: &str = "https://museum.test/v1";

/// Museum search query used by museum fixtures.
pub const MUSEUM_SEARCH_QUERY: &str = "hasImages=true&q=painting";

/// Default configuration pointed at the fixture endpoints.
pub fn test_config() -> VitrineConfig {
  VitrineConfig {
    gallery: GalleryConfig {
      manifest_url: GALLERY_MANIFEST_URL.to_string(),
    },
    museum: MuseumConfig {
      base_url: MUSEUM_BASE_URL.to_string(),
      search_query: MUSEUM_SEARCH_QUERY.to_string(),
    },
    ..VitrineConfig::default()
  }
}

pub fn museum_search_url() -> String {
  format!("{MUSEUM_BASE_URL}/search?{MUSEUM_SEARCH_QUERY}")
}

pub fn museum_object_url(object_id: u64) -> String {
  format!("{MUSEUM_BASE_URL}/objects/{object_id}")
}

/// Raw image URL (before the size suffix) for a gallery fixture.
pub fn gallery_image_url(id: &str) -> String {
  format!("https://lh3.gallery.test/{id}")
}

pub fn museum_image_url(object_id: u64) -> String {
  format!("https://images.museum.test/{object_id}.jpg")
}

/// One gallery manifest record.
pub fn gallery_record(id: &str, title: &str) -> Value {
  json!({
    "id": id,
    "title": title,
    "creator": format!("Painter of {title}"),
    "attribution": "Test Collection",
    "image": gallery_image_url(id),
    "link": format!("{id}/detail"),
  })
}

/// One museum object record. `with_image = false` blanks `primaryImage`.
pub fn museum_object(object_id: u64, title: &str, with_image: bool, public_domain: bool) -> Value {
  json!({
    "objectID": object_id,
    "title": title,
    "artistDisplayName": "",
    "constituents": [{ "name": "Workshop Master" }],
    "culture": "Dutch",
    "period": "",
    "dynasty": "",
    "reign": "",
    "creditLine": "Gift of a test donor",
    "primaryImage": if with_image { museum_image_url(object_id) } else { String::new() },
    "objectURL": format!("https://museum.test/art/{object_id}"),
    "isPublicDomain": public_domain,
  })
}

/// Museum search response listing `ids`.
pub fn museum_search(ids: &[u64]) -> Value {
  json!({ "total": ids.len(), "objectIDs": ids })
}
