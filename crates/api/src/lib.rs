//! Big Movie Bois API server library.
//!
//! Exposes config, state, error handling, engines, routes and the WebSocket
//! infrastructure so integration tests and the binary entrypoint can both
//! use them.

pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod query;
pub mod realtime;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
