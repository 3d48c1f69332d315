//! Real-time side channel for league updates.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RealtimeEvent`]: the envelope delivered to WebSocket subscribers of
//!   a `{domain}:{entityId}:{event}` topic.
//!
//! Publishing is fire-and-forget: a publish never fails the mutation that
//! triggered it.

pub mod bus;

pub use bus::{EventBus, RealtimeEvent};
