//! Route definitions for the `/sessions` resource, including the draft.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{draft, session};
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}/settings           -> update_settings
/// GET    /{id}/studios            -> list_studios
/// POST   /{id}/studios            -> create_studio
/// GET    /{id}/standings          -> standings
/// POST   /{id}/scores/refresh     -> refresh_scores
/// POST   /{id}/settle             -> settle
/// GET    /{id}/activity           -> activity
///
/// GET    /{id}/draft              -> draft::get_state
/// POST   /{id}/draft/start        -> draft::start
/// POST   /{id}/draft/picks        -> draft::make_pick
/// ```
pub fn router() -> Router<AppState> {
    let draft_routes = Router::new()
        .route("/", get(draft::get_state))
        .route("/start", post(draft::start))
        .route("/picks", post(draft::make_pick));

    Router::new()
        .route("/{id}", get(session::get_by_id))
        .route("/{id}/settings", put(session::update_settings))
        .route(
            "/{id}/studios",
            get(session::list_studios).post(session::create_studio),
        )
        .route("/{id}/standings", get(session::standings))
        .route("/{id}/scores/refresh", post(session::refresh_scores))
        .route("/{id}/settle", post(session::settle))
        .route("/{id}/activity", get(session::activity))
        .nest("/{id}/draft", draft_routes)
}
