//! Tests for the event relay between the bus and WebSocket topics.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use bmb_api::realtime::EventRelay;
use bmb_api::ws::WsManager;
use bmb_events::{EventBus, RealtimeEvent};

fn payload(message: Message) -> serde_json::Value {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn deliver_sends_serialized_event_to_topic() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("conn-1".to_string()).await;
    manager.subscribe("conn-1", "studio:9:bid-won").await;

    let relay = EventRelay::new(Arc::clone(&manager));
    let event = RealtimeEvent::bid_won(9).with_payload(serde_json::json!({"filmId": 603}));
    assert_eq!(relay.deliver(&event).await, 1);

    let json = payload(rx.recv().await.unwrap());
    assert_eq!(json["topic"], "studio:9:bid-won");
    assert_eq!(json["event"], "bid-won");
    assert_eq!(json["payload"]["filmId"], 603);
}

#[tokio::test]
async fn run_forwards_bus_events_and_stops_when_bus_closes() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("conn-1".to_string()).await;
    manager.subscribe("conn-1", "draft:5:draft-update").await;

    let bus = EventBus::default();
    let relay = EventRelay::new(Arc::clone(&manager));
    let handle = tokio::spawn(relay.run(bus.subscribe()));

    bus.publish(RealtimeEvent::score_update(1));
    bus.publish(RealtimeEvent::draft_update(5));

    let message = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload(message)["topic"], "draft:5:draft-update");

    drop(bus);
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(rx.try_recv().is_err());
}
