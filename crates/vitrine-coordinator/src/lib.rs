//! Vitrine Coordinator
//!
//! The process-wide owner of the rotation. Foreground contexts never touch
//! the [`ArtManager`](vitrine_manager::ArtManager) themselves: they send a
//! [`Command`] and render the [`Reply`], or listen for [`Notification`]s.
//!
//! [`CoordinatorRunner`] processes commands one at a time, which makes the
//! coordinator the sole writer of the art state.

mod coordinator;
mod error;
mod message;
mod notify;
mod runner;

pub use coordinator::{BackgroundCoordinator, DEFAULT_MAX_ATTEMPTS};
pub use error::CoordinatorError;
pub use message::{Command, CurrentArt, Notification, Reply};
pub use notify::{Broadcaster, ChannelBroadcaster, NoopBroadcaster};
pub use runner::{CoordinatorHandle, CoordinatorRunner, Envelope};
