//! In-process event bus.

use tokio::sync::broadcast;

use super::SyncEvent;

/// Broadcast channel for [`SyncEvent`]s.
///
/// Publishing never blocks and never fails; events sent while nobody
/// listens are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Create a new bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: impl Into<SyncEvent>) {
        let _ = self.sender.send(event.into());
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventPayload, MetadataEvent};
    use crate::types::id::FolderId;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(MetadataEvent::FolderLocked {
            folder_id: FolderId::from("7"),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event.payload,
            EventPayload::Metadata(MetadataEvent::FolderLocked { .. })
        ));
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(MetadataEvent::FolderLocked {
            folder_id: FolderId::from("7"),
        });
    }
}
