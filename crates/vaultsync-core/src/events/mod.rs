//! Domain events emitted by VaultSync operations.
//!
//! Events are published on an [`EventBus`] and consumed by whoever
//! subscribed (the CLI progress output, tests). Only
//! [`DeleteEvent::Finished`] is part of the delete propagator's external
//! contract; metadata events are informational.

pub mod bus;
pub mod delete;
pub mod metadata;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use delete::DeleteEvent;
pub use metadata::MetadataEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A metadata coordinator step completed.
    Metadata(MetadataEvent),
    /// A delete propagation event.
    Delete(DeleteEvent),
}

impl SyncEvent {
    /// Create a new domain event.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

impl From<MetadataEvent> for SyncEvent {
    fn from(event: MetadataEvent) -> Self {
        Self::new(EventPayload::Metadata(event))
    }
}

impl From<DeleteEvent> for SyncEvent {
    fn from(event: DeleteEvent) -> Self {
        Self::new(EventPayload::Delete(event))
    }
}
