//! Event types for the videolog event system
//!
//! Provides shared event definitions and the EventBus. State owners (the
//! permission manager, the asset cache, the thumbnail loader, the metadata
//! inspector) write their state first and emit afterwards, so a subscriber
//! that reacts to an event always reads a consistent value.

mod types;

pub use types::{AuthorizationStatus, ThumbnailSize};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// videolog event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VideologEvent {
    /// Library authorization status changed
    ///
    /// Triggers:
    /// - UI: swap the "requesting access" placeholder for the studio list,
    ///   or for the persistent "access denied" message
    AuthorizationChanged {
        /// Status before the request
        old_status: AuthorizationStatus,
        /// Status reported by the library
        new_status: AuthorizationStatus,
        /// When the status changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Filtered asset list for a studio is available
    ///
    /// Emitted after the cache entry is written (first open) and on every
    /// later open that was served from the cache.
    StudioAssetsReady {
        /// Studio identity
        studio_id: Uuid,
        /// Number of assets in the cached result
        asset_count: usize,
        /// True if served from the cache without filtering
        from_cache: bool,
        /// When the result was published
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A thumbnail finished loading
    ThumbnailReady {
        /// Local identifier of the asset
        asset_id: String,
        /// Size actually delivered
        size: ThumbnailSize,
        /// When the thumbnail arrived
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A thumbnail request failed
    ThumbnailFailed {
        /// Local identifier of the asset
        asset_id: String,
        /// Library error text
        reason: String,
        /// When the failure was observed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Metadata inspection finished for an asset
    ///
    /// `failed_formats` lists formats that could not be read; the other
    /// formats' items are still part of the report.
    MetadataInspected {
        /// Local identifier of the asset
        asset_id: String,
        /// Number of common-key items extracted
        item_count: usize,
        /// Formats that failed to load
        failed_formats: Vec<String>,
        /// When inspection finished
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Metadata inspection could not start for an asset
    InspectionFailed {
        /// Local identifier of the asset
        asset_id: String,
        /// Why no decodable form was available
        reason: String,
        /// When the failure was observed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl VideologEvent {
    /// Event type name as used in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            VideologEvent::AuthorizationChanged { .. } => "AuthorizationChanged",
            VideologEvent::StudioAssetsReady { .. } => "StudioAssetsReady",
            VideologEvent::ThumbnailReady { .. } => "ThumbnailReady",
            VideologEvent::ThumbnailFailed { .. } => "ThumbnailFailed",
            VideologEvent::MetadataInspected { .. } => "MetadataInspected",
            VideologEvent::InspectionFailed { .. } => "InspectionFailed",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Default channel capacity for interactive use
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use videolog_common::events::{AuthorizationStatus, EventBus, VideologEvent};
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit(VideologEvent::AuthorizationChanged {
///     old_status: AuthorizationStatus::NotDetermined,
///     new_status: AuthorizationStatus::Authorized,
///     timestamp: chrono::Utc::now(),
/// }).ok();
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VideologEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<VideologEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: VideologEvent,
    ) -> Result<usize, broadcast::error::SendError<VideologEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: VideologEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(count: usize) -> VideologEvent {
        VideologEvent::StudioAssetsReady {
            studio_id: Uuid::new_v4(),
            asset_count: count,
            from_cache: false,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(4);
        assert!(bus.emit(ready(1)).is_err());
        // Lossy variant never fails
        bus.emit_lossy(ready(1));
    }

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let bus = EventBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.emit(ready(3)).unwrap(), 2);

        for rx in [&mut a, &mut b] {
            match rx.recv().await.unwrap() {
                VideologEvent::StudioAssetsReady { asset_count, .. } => assert_eq!(asset_count, 3),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn test_serialized_tag_matches_event_type() {
        let event = VideologEvent::ThumbnailFailed {
            asset_id: "A1".to_string(),
            reason: "offline".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert_eq!(json["asset_id"], "A1");
    }

    #[test]
    fn test_capacity_reported() {
        assert_eq!(EventBus::new(32).capacity(), 32);
        assert_eq!(EventBus::default().capacity(), DEFAULT_EVENT_CAPACITY);
    }
}
