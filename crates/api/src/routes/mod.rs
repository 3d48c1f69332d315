pub mod bid;
pub mod health;
pub mod league;
pub mod session;
pub mod studio;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                       WebSocket (topic subscriptions)
///
/// /leagues                                  create
/// /leagues/{id}                             get
/// /leagues/{id}/sessions                    list, create
///
/// /sessions/{id}                            get
/// /sessions/{id}/settings                   replace (PUT, before the draft)
/// /sessions/{id}/studios                    list, create
/// /sessions/{id}/standings                  live standings
/// /sessions/{id}/scores/refresh             persist scores (POST)
/// /sessions/{id}/settle                     settle pending bids (POST)
/// /sessions/{id}/activity                   activity feed
/// /sessions/{id}/draft                      draft state
/// /sessions/{id}/draft/start                start the draft (POST)
/// /sessions/{id}/draft/picks                make a pick (POST)
///
/// /studios/{id}                             studio with roster
/// /studios/{id}/swap                        swap slots (POST)
/// /studios/{id}/slots/{slot}                drop film (DELETE)
/// /studios/{id}/bids                        list, place
///
/// /bids/{id}?studioId=                      cancel pending bid (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/leagues", league::router())
        .nest("/sessions", session::router())
        .nest("/studios", studio::router())
        .nest("/bids", bid::router())
}
