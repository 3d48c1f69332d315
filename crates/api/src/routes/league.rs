//! Route definitions for the `/leagues` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::league;
use crate::state::AppState;

/// Routes mounted at `/leagues`.
///
/// ```text
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// GET    /{id}/sessions     -> list_sessions
/// POST   /{id}/sessions     -> create_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(league::create))
        .route("/{id}", get(league::get_by_id))
        .route(
            "/{id}/sessions",
            get(league::list_sessions).post(league::create_session),
        )
}
