//! WebSocket infrastructure for live league updates.
//!
//! Connections subscribe to topics such as `draft:12:draft-update`; the
//! event relay fans bus events out to every connection subscribed to the
//! event's topic.

pub mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
