//! Vitrine Manager
//!
//! [`ArtManager`] owns the provider registry and the persisted
//! [`ArtState`]: which provider is active, where the rotation stands and
//! whether it advances on every open. Provider operations are routed to
//! the active provider unchanged.

mod error;
mod manager;
mod settings;
mod state;

pub use error::ManagerError;
pub use manager::ArtManager;
pub use settings::{UserSettingUpdate, UserSettings};
pub use state::{ART_STATE_KEY, ArtState};
