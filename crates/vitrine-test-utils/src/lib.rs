//! Testing utilities for the vitrine workspace.
//!
//! Shared fetcher double, URLs and raw payload fixtures.

mod fetcher;
mod fixtures;

pub use fetcher::{Route, ScriptedFetcher};
pub use fixtures::{
  GALLERY_MANIFEST_URL, MUSEUM_BASE_URL, MUSEUM_SEARCH_QUERY, gallery_image_url, gallery_record,
  museum_image_url, museum_object, museum_object_url, museum_search, museum_search_url, test_config,
};
