use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bmb_api::background::{draft_clock, settlement_schedule};
use bmb_api::config::ServerConfig;
use bmb_api::realtime::EventRelay;
use bmb_api::router::build_app_router;
use bmb_api::state::AppState;
use bmb_api::ws;
use bmb_filmdb::{CachedFilmSource, FilmMetadataSource, TmdbClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bmb_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = bmb_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    bmb_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    bmb_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Film metadata ---
    let tmdb: Arc<dyn FilmMetadataSource> = Arc::new(TmdbClient::new(
        config.film_db.base_url.clone(),
        config.film_db.api_key.clone(),
    ));
    let films: Arc<dyn FilmMetadataSource> = Arc::new(CachedFilmSource::new(
        tmdb,
        Duration::from_secs(config.film_db.cache_ttl_secs),
    ));
    tracing::info!(base_url = %config.film_db.base_url, "Film metadata client ready");

    // --- WebSocket manager + heartbeat ---
    let cancel = CancellationToken::new();
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), cancel.clone());

    // --- Event bus + relay ---
    let event_bus = Arc::new(bmb_events::EventBus::default());
    let relay = EventRelay::new(Arc::clone(&ws_manager));
    let relay_handle = tokio::spawn(relay.run(event_bus.subscribe()));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
        films,
    };

    // --- Scheduled work ---
    let settlement_handle = tokio::spawn(settlement_schedule::run(
        state.clone(),
        config.settlement,
        cancel.clone(),
    ));
    let draft_clock_handle = tokio::spawn(draft_clock::run(
        state.clone(),
        Duration::from_secs(config.draft_clock_interval_secs),
        cancel.clone(),
    ));
    tracing::info!("Background tasks started (relay, heartbeat, settlement scheduler, draft clock)");

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    let _ = tokio::time::timeout(grace, settlement_handle).await;
    let _ = tokio::time::timeout(grace, draft_clock_handle).await;
    let _ = tokio::time::timeout(grace, heartbeat_handle).await;
    tracing::info!("Background tasks stopped");

    // Dropping the last bus handle closes the channel and ends the relay.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, relay_handle).await;

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
