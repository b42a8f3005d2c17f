//! Vitrine Asset
//!
//! The provider-independent artwork model. Each provider's raw payload is
//! normalized into one variant of [`Asset`]; the variants share the
//! [`ArtAsset`] contract and differ in how they resolve image and detail
//! URLs.
//!
//! Serialized assets carry a `provider` tag, and deserialization picks the
//! variant from it.

mod asset;
mod error;
mod gallery;
mod museum;

pub use asset::{ArtAsset, Asset, UNKNOWN_ARTIST, UNTITLED};
pub use error::AssetError;
pub use gallery::{GALLERY_PROVIDER, GalleryAsset, GalleryRecord};
pub use museum::{Constituent, MUSEUM_PROVIDER, MuseumAsset, MuseumRecord, MuseumSearch};
