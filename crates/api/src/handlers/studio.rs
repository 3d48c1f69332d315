//! Handlers for the `/studios` resource: roster view and changes.

use axum::extract::{Path, State};
use axum::Json;
use bmb_core::types::{DbId, SlotPosition};
use bmb_db::models::studio::Studio;
use bmb_db::models::studio_film::StudioFilm;
use bmb_db::repositories::StudioFilmRepo;
use serde::{Deserialize, Serialize};

use crate::engine::load_studio;
use crate::engine::roster::{self, DropOutcome};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A studio together with its roster.
#[derive(Debug, Serialize)]
pub struct StudioWithFilms {
    #[serde(flatten)]
    pub studio: Studio,
    pub films: Vec<StudioFilm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub from_slot: SlotPosition,
    pub to_slot: SlotPosition,
}

/// GET /api/v1/studios/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudioWithFilms>>> {
    let studio = load_studio(&state.pool, id).await?;
    let films = StudioFilmRepo::list_by_studio(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: StudioWithFilms { studio, films },
    }))
}

/// POST /api/v1/studios/{id}/swap
pub async fn swap(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SwapRequest>,
) -> AppResult<Json<DataResponse<Vec<StudioFilm>>>> {
    let moved = roster::swap(&state, id, input.from_slot, input.to_slot).await?;
    Ok(Json(DataResponse { data: moved }))
}

/// DELETE /api/v1/studios/{id}/slots/{slot}
pub async fn drop_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(DbId, SlotPosition)>,
) -> AppResult<Json<DataResponse<DropOutcome>>> {
    let outcome = roster::drop_film(&state, id, slot).await?;
    Ok(Json(DataResponse { data: outcome }))
}
