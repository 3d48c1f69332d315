//! Route definitions for the `/bids` resource.

use axum::routing::delete;
use axum::Router;

use crate::handlers::bid;
use crate::state::AppState;

/// Routes mounted at `/bids`.
///
/// ```text
/// DELETE /{id}?studioId=   -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(bid::cancel))
}
