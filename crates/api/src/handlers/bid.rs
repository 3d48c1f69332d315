//! Handlers for sealed bids.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bmb_core::types::{Amount, DbId, FilmId, SlotPosition};
use bmb_db::models::film_bid::FilmBid;
use serde::Deserialize;
use validator::Validate;

use crate::engine::bidding;
use crate::error::AppResult;
use crate::query::ActingStudioParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidRequest {
    #[validate(range(min = 1))]
    pub film_id: FilmId,
    #[validate(range(min = 1))]
    pub slot: SlotPosition,
    pub amount: Amount,
}

/// GET /api/v1/studios/{id}/bids
pub async fn list_by_studio(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FilmBid>>>> {
    let bids = bidding::list_bids(&state, id).await?;
    Ok(Json(DataResponse { data: bids }))
}

/// POST /api/v1/studios/{id}/bids
pub async fn place(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PlaceBidRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<FilmBid>>)> {
    input.validate()?;
    let bid = bidding::place_bid(&state, id, input.film_id, input.slot, input.amount).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: bid })))
}

/// DELETE /api/v1/bids/{id}?studioId=
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ActingStudioParams>,
) -> AppResult<StatusCode> {
    bidding::cancel_bid(&state, id, params.studio_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
