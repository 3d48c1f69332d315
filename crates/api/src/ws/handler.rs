use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use bmb_core::topics::is_valid_topic;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// A client request on an open socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientMessage {
    Subscribe { topic: String },
    Unsubscribe { topic: String },
}

/// Server acknowledgement for a [`ClientMessage`].
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerReply {
    Subscribed { topic: String },
    Unsubscribed { topic: String },
    Error { message: String },
}

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Registers the connection, spawns a sender task that drains the manager
/// channel into the sink, and handles subscription requests until the
/// client disconnects.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                let reply = handle_client_message(&ws_manager, &conn_id, text.as_str()).await;
                send_reply(&ws_manager, &conn_id, &reply).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Apply one inbound text frame to the connection's subscriptions.
pub async fn handle_client_message(
    ws_manager: &WsManager,
    conn_id: &str,
    text: &str,
) -> ServerReply {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            return ServerReply::Error {
                message: format!("Malformed message: {e}"),
            }
        }
    };

    match message {
        ClientMessage::Subscribe { topic } => {
            if !is_valid_topic(&topic) {
                return ServerReply::Error {
                    message: format!("Invalid topic '{topic}'"),
                };
            }
            ws_manager.subscribe(conn_id, &topic).await;
            tracing::debug!(conn_id, %topic, "Subscribed");
            ServerReply::Subscribed { topic }
        }
        ClientMessage::Unsubscribe { topic } => {
            ws_manager.unsubscribe(conn_id, &topic).await;
            tracing::debug!(conn_id, %topic, "Unsubscribed");
            ServerReply::Unsubscribed { topic }
        }
    }
}

async fn send_reply(ws_manager: &WsManager, conn_id: &str, reply: &ServerReply) {
    match serde_json::to_string(reply) {
        Ok(json) => {
            ws_manager.send_to(conn_id, Message::Text(json.into())).await;
        }
        Err(e) => tracing::warn!(conn_id, error = %e, "Failed to serialize WebSocket reply"),
    }
}
