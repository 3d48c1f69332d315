use std::sync::Arc;

use bmb_filmdb::FilmMetadataSource;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Background tasks receive a clone as well.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bmb_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Real-time side channel; the relay forwards it to WebSocket topics.
    pub event_bus: Arc<bmb_events::EventBus>,
    /// Film metadata provider (cached).
    pub films: Arc<dyn FilmMetadataSource>,
}
