//! Handlers for the `/leagues` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bmb_core::session_settings::{validate_date_range, SessionSettings};
use bmb_core::types::DbId;
use bmb_db::models::league::{CreateLeague, League};
use bmb_db::models::league_session::{CreateLeagueSession, LeagueSession};
use bmb_db::repositories::{LeagueRepo, LeagueSessionRepo};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeagueRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub owner_id: DbId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub settings: SessionSettings,
}

/// POST /api/v1/leagues
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateLeagueRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<League>>)> {
    input.validate()?;
    let league = LeagueRepo::create(
        &state.pool,
        &CreateLeague {
            name: input.name,
            owner_id: input.owner_id,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: league })))
}

/// GET /api/v1/leagues/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<League>>> {
    let league = LeagueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("League", id))?;
    Ok(Json(DataResponse { data: league }))
}

/// GET /api/v1/leagues/{id}/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<LeagueSession>>>> {
    let sessions = LeagueSessionRepo::list_by_league(&state.pool, id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// POST /api/v1/leagues/{id}/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LeagueSession>>)> {
    input.validate()?;
    validate_date_range(input.start_date, input.end_date)?;
    input.settings.validate()?;

    LeagueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("League", id))?;

    let session = LeagueSessionRepo::create(
        &state.pool,
        &CreateLeagueSession {
            league_id: id,
            name: input.name,
            start_date: input.start_date,
            end_date: input.end_date,
            settings: input.settings,
        },
    )
    .await?;
    tracing::info!(league_id = id, session_id = session.id, "Session created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}
