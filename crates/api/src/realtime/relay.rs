//! Event-to-socket fan-out.

use std::sync::Arc;

use axum::extract::ws::Message;
use bmb_events::RealtimeEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Forwards [`RealtimeEvent`]s from the bus to topic subscribers.
pub struct EventRelay {
    ws_manager: Arc<WsManager>,
}

impl EventRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop.
    ///
    /// Exits when the channel is closed (the [`EventBus`](bmb_events::EventBus)
    /// is dropped). A lagging receiver logs the number of skipped events and
    /// carries on with the newest ones.
    pub async fn run(self, mut receiver: broadcast::Receiver<RealtimeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.deliver(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event relay shutting down");
                    break;
                }
            }
        }
    }

    /// Send one event to its topic's subscribers. Returns the number of
    /// connections reached.
    pub async fn deliver(&self, event: &RealtimeEvent) -> usize {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(topic = %event.topic, error = %e, "Failed to serialize event");
                return 0;
            }
        };

        let delivered = self
            .ws_manager
            .send_to_topic(&event.topic, Message::Text(json.into()))
            .await;
        tracing::debug!(topic = %event.topic, delivered, "Relayed event");
        delivered
    }
}
