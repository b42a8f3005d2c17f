//! Vitrine Provider
//!
//! A provider turns one remote art API into an indexable sequence of
//! [`Asset`](vitrine_asset::Asset)s. Two implementations ship:
//!
//! - [`GalleryProvider`] syncs a static manifest. Every index below the
//!   count is displayable.
//! - [`MuseumProvider`] syncs only candidate object IDs and fetches each
//!   object lazily on first lookup. Any index may turn out to be a hole.
//!
//! Provider operations report failure as `false` / `None` and log the
//! cause. They never return errors to the caller.

mod context;
mod error;
mod gallery;
mod museum;
mod provider;
mod registry;

pub use context::ProviderContext;
pub use error::RegistryError;
pub use gallery::GalleryProvider;
pub use museum::MuseumProvider;
pub use provider::ArtProvider;
pub use registry::{ProviderInfo, ProviderRegistry};

#[cfg(test)]
pub(crate) mod testing;
