//! Handlers for `/sessions/{id}/draft`.

use axum::extract::{Path, State};
use axum::Json;
use bmb_core::types::{DbId, FilmId, SlotPosition};
use serde::Deserialize;

use crate::engine::draft::{self, DraftView};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakePickRequest {
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
}

/// GET /api/v1/sessions/{id}/draft
pub async fn get_state(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let view = draft::draft_view(&state, id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/sessions/{id}/draft/start
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let view = draft::start_draft(&state, id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/sessions/{id}/draft/picks
pub async fn make_pick(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MakePickRequest>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let view = draft::make_pick(&state, id, input.studio_id, input.film_id, input.slot).await?;
    Ok(Json(DataResponse { data: view }))
}
