//! Message runner for the coordinator.
//!
//! The `CoordinatorRunner` owns an mpsc channel of [`Envelope`]s and feeds
//! them to the [`BackgroundCoordinator`] one at a time.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coordinator::BackgroundCoordinator;
use crate::error::CoordinatorError;
use crate::message::{Command, Notification, Reply};
use crate::notify::ChannelBroadcaster;

/// A command plus the channel its reply goes back on.
pub struct Envelope {
  pub command: Command,
  pub reply: oneshot::Sender<Result<Reply, CoordinatorError>>,
}

/// Runs the coordinator's command loop.
///
/// # Usage
///
/// ```ignore
/// let broadcaster = ChannelBroadcaster::new(16);
/// let coordinator = BackgroundCoordinator::new(manager, Arc::new(broadcaster.clone()));
/// let runner = CoordinatorRunner::new(Arc::new(coordinator), broadcaster);
///
/// // Handles go to every foreground context
/// let handle = runner.handle();
///
/// // Start the command loop
/// let cancel = CancellationToken::new();
/// tokio::spawn(runner.start(cancel));
/// ```
pub struct CoordinatorRunner {
  sender: mpsc::Sender<Envelope>,
  receiver: mpsc::Receiver<Envelope>,
  coordinator: Arc<BackgroundCoordinator>,
  broadcaster: ChannelBroadcaster,
}

impl CoordinatorRunner {
  pub fn new(coordinator: Arc<BackgroundCoordinator>, broadcaster: ChannelBroadcaster) -> Self {
    Self::with_buffer_size(coordinator, broadcaster, 100)
  }

  pub fn with_buffer_size(
    coordinator: Arc<BackgroundCoordinator>,
    broadcaster: ChannelBroadcaster,
    buffer_size: usize,
  ) -> Self {
    let (sender, receiver) = mpsc::channel(buffer_size);
    Self {
      sender,
      receiver,
      coordinator,
      broadcaster,
    }
  }

  pub fn handle(&self) -> CoordinatorHandle {
    CoordinatorHandle {
      sender: self.sender.clone(),
      broadcaster: self.broadcaster.clone(),
    }
  }

  pub fn coordinator(&self) -> &Arc<BackgroundCoordinator> {
    &self.coordinator
  }

  /// Process commands until `cancel` fires or every handle is dropped.
  pub async fn start(self, cancel: CancellationToken) {
    let Self {
      sender,
      mut receiver,
      coordinator,
      ..
    } = self;
    // Only handles keep the channel open from here on.
    drop(sender);

    info!("starting coordinator runner");

    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          info!("coordinator runner cancelled");
          break;
        }
        envelope = receiver.recv() => {
          let Some(Envelope { command, reply }) = envelope else {
            info!("coordinator runner channel closed");
            break;
          };

          let kind = command.kind();
          debug!(command = kind, "handling command");

          let result = coordinator.handle(command).await;
          if let Err(e) = &result {
            warn!(command = kind, error = %e, "command failed");
          }

          // The requester may have gone away.
          let _ = reply.send(result);
        }
      }
    }
  }
}

/// Cloneable handle for sending commands and subscribing to notifications.
#[derive(Clone)]
pub struct CoordinatorHandle {
  sender: mpsc::Sender<Envelope>,
  broadcaster: ChannelBroadcaster,
}

impl CoordinatorHandle {
  /// Send a command and wait for its reply.
  pub async fn request(&self, command: Command) -> Result<Reply, CoordinatorError> {
    let (reply, response) = oneshot::channel();
    self
      .sender
      .send(Envelope { command, reply })
      .await
      .map_err(|_| CoordinatorError::ChannelClosed)?;
    response.await.map_err(|_| CoordinatorError::ChannelClosed)?
  }

  /// Parse a JSON message and send it.
  pub async fn request_json(&self, json: &str) -> Result<Reply, CoordinatorError> {
    self.request(Command::from_json(json)?).await
  }

  /// Queue a command without waiting for the reply.
  pub async fn send(&self, command: Command) -> Result<(), CoordinatorError> {
    let (reply, _) = oneshot::channel();
    self
      .sender
      .send(Envelope { command, reply })
      .await
      .map_err(|_| CoordinatorError::ChannelClosed)
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
    self.broadcaster.subscribe()
  }
}
