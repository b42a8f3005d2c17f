//! Change notification fan-out.
//!
//! Delivery is best effort: nobody acknowledges a notification, and a
//! context that needs the current state asks for it explicitly.

use tokio::sync::broadcast;

use crate::message::Notification;

/// Receives every notification the coordinator publishes.
pub trait Broadcaster: Send + Sync {
  fn publish(&self, notification: Notification);
}

/// Discards all notifications.
#[derive(Debug, Clone, Default)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
  fn publish(&self, _notification: Notification) {}
}

/// Fans notifications out to every current subscriber.
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
  sender: broadcast::Sender<Notification>,
}

impl ChannelBroadcaster {
  /// `capacity` notifications are buffered per subscriber before the
  /// oldest are dropped.
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
    self.sender.subscribe()
  }
}

impl Broadcaster for ChannelBroadcaster {
  fn publish(&self, notification: Notification) {
    // No subscribers is fine.
    let _ = self.sender.send(notification);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn updated(index: usize) -> Notification {
    Notification::AssetUpdated {
      new_index: index,
      asset: None,
      image_url: None,
      total_assets: None,
    }
  }

  #[tokio::test]
  async fn test_every_subscriber_receives() {
    let broadcaster = ChannelBroadcaster::new(8);
    let mut first = broadcaster.subscribe();
    let mut second = broadcaster.subscribe();

    broadcaster.publish(updated(3));

    assert_eq!(first.recv().await.unwrap(), updated(3));
    assert_eq!(second.recv().await.unwrap(), updated(3));
  }

  #[test]
  fn test_publish_without_subscribers() {
    ChannelBroadcaster::new(8).publish(updated(0));
    NoopBroadcaster.publish(updated(0));
  }
}
