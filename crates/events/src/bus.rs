//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application. The
//! WebSocket relay is its main subscriber.

use bmb_core::topics;
use bmb_core::types::DbId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RealtimeEvent
// ---------------------------------------------------------------------------

/// An update addressed to one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeEvent {
    /// Full topic, e.g. `"draft:12:draft-update"`.
    pub topic: String,

    /// Event name, the last segment of the topic.
    pub event: String,

    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl RealtimeEvent {
    /// Build an event for `{domain}:{entity_id}:{event}` with an empty payload.
    pub fn new(domain: &str, entity_id: DbId, event: &str) -> Self {
        Self {
            topic: topics::topic(domain, entity_id, event),
            event: event.to_string(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn draft_update(session_id: DbId) -> Self {
        Self::new(topics::DOMAIN_DRAFT, session_id, topics::EVENT_DRAFT_UPDATE)
    }

    pub fn bids_settled(session_id: DbId) -> Self {
        Self::new(topics::DOMAIN_SESSION, session_id, topics::EVENT_BIDS_SETTLED)
    }

    pub fn bid_won(studio_id: DbId) -> Self {
        Self::new(topics::DOMAIN_STUDIO, studio_id, topics::EVENT_BID_WON)
    }

    pub fn score_update(studio_id: DbId) -> Self {
        Self::new(topics::DOMAIN_STUDIO, studio_id, topics::EVENT_SCORE_UPDATE)
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Serialize `payload` into the event.
    ///
    /// A value that fails to serialize is logged and leaves the payload
    /// empty; the event is still delivered.
    pub fn with_data<T: Serialize>(mut self, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => self.payload = value,
            Err(e) => {
                tracing::warn!(topic = %self.topic, error = %e, "Failed to serialize event payload");
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use bmb_events::bus::{EventBus, RealtimeEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RealtimeEvent::draft_update(12));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: RealtimeEvent) {
        let topic = event.topic.clone();
        if self.sender.send(event).is_err() {
            tracing::trace!(%topic, "No subscribers for event");
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            RealtimeEvent::draft_update(12).with_payload(serde_json::json!({"sessionId": 12})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.topic, "draft:12:draft-update");
        assert_eq!(received.event, "draft-update");
        assert_eq!(received.payload["sessionId"], 12);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(RealtimeEvent::bid_won(3));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.topic, "studio:3:bid-won");
        assert_eq!(e2.topic, "studio:3:bid-won");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(RealtimeEvent::bids_settled(1));
    }

    #[test]
    fn with_data_serializes_struct() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Score {
            studio_id: i64,
            score: f64,
        }

        let event = RealtimeEvent::score_update(4).with_data(&Score {
            studio_id: 4,
            score: 12.5,
        });
        assert_eq!(event.topic, "studio:4:score-update");
        assert_eq!(event.payload["studioId"], 4);
        assert_eq!(event.payload["score"], 12.5);
    }

    #[test]
    fn new_event_has_empty_object_payload() {
        let event = RealtimeEvent::new("session", 9, "custom");
        assert_eq!(event.topic, "session:9:custom");
        assert!(event.payload.is_object());
    }
}
