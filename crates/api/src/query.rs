//! Shared query parameter types for API handlers.

use bmb_core::types::{DbId, Timestamp};
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the repository layer.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?cutoff=` for on-demand settlement. Defaults to now.
#[derive(Debug, Deserialize)]
pub struct SettleParams {
    pub cutoff: Option<Timestamp>,
}

/// Identifies the acting studio on endpoints without a request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingStudioParams {
    pub studio_id: DbId,
}
