//! Route definitions for the `/studios` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{bid, studio};
use crate::state::AppState;

/// Routes mounted at `/studios`.
///
/// ```text
/// GET    /{id}                -> get_by_id
/// POST   /{id}/swap           -> swap
/// DELETE /{id}/slots/{slot}   -> drop_slot
/// GET    /{id}/bids           -> bid::list_by_studio
/// POST   /{id}/bids           -> bid::place
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(studio::get_by_id))
        .route("/{id}/swap", post(studio::swap))
        .route("/{id}/slots/{slot}", delete(studio::drop_slot))
        .route("/{id}/bids", get(bid::list_by_studio).post(bid::place))
}
