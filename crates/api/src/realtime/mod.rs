//! Delivery of bus events to WebSocket subscribers.
//!
//! The [`EventRelay`] subscribes to the event bus and forwards each event to
//! the connections subscribed to its topic.

pub mod relay;

pub use relay::EventRelay;
