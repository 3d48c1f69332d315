//! Handlers for the `/sessions` resource: settings, studios, standings,
//! settlement and the activity feed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bmb_core::error::CoreError;
use bmb_core::session_settings::SessionSettings;
use bmb_core::types::DbId;
use bmb_db::models::activity::Activity;
use bmb_db::models::league_session::LeagueSession;
use bmb_db::models::studio::{CreateStudio, Studio};
use bmb_db::repositories::{ActivityRepo, LeagueSessionRepo, StudioRepo};
use serde::Deserialize;
use validator::Validate;

use crate::engine::scoring::{self, StudioStanding};
use crate::engine::settlement::{self, SettlementReport};
use crate::engine::load_session;
use crate::error::AppResult;
use crate::query::{PaginationParams, SettleParams};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudioRequest {
    pub owner_id: DbId,
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[validate(length(max = 255))]
    pub icon: Option<String>,
}

/// GET /api/v1/sessions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LeagueSession>>> {
    let session = load_session(&state.pool, id).await?;
    Ok(Json(DataResponse { data: session }))
}

/// PUT /api/v1/sessions/{id}/settings
///
/// Settings are frozen once the draft has started.
pub async fn update_settings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(settings): Json<SessionSettings>,
) -> AppResult<Json<DataResponse<LeagueSession>>> {
    settings.validate()?;
    match LeagueSessionRepo::update_settings(&state.pool, id, &settings).await? {
        Some(session) => Ok(Json(DataResponse { data: session })),
        None => {
            load_session(&state.pool, id).await?;
            Err(CoreError::Conflict(
                "Settings cannot change after the draft has started".to_string(),
            )
            .into())
        }
    }
}

/// GET /api/v1/sessions/{id}/studios
pub async fn list_studios(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Studio>>>> {
    let studios = StudioRepo::list_by_session(&state.pool, id).await?;
    Ok(Json(DataResponse { data: studios }))
}

/// POST /api/v1/sessions/{id}/studios
///
/// The studio opens with the session's starting budget. An owner may hold
/// one studio per session.
pub async fn create_studio(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateStudioRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Studio>>)> {
    input.validate()?;
    let session = load_session(&state.pool, id).await?;
    let studio = StudioRepo::create(
        &state.pool,
        &CreateStudio {
            session_id: id,
            owner_id: input.owner_id,
            name: input.name,
            icon: input.icon,
        },
        session.settings.starting_budget,
    )
    .await?;
    tracing::info!(session_id = id, studio_id = studio.id, "Studio created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: studio })))
}

/// GET /api/v1/sessions/{id}/standings
pub async fn standings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StudioStanding>>>> {
    let standings = scoring::list_standings(&state, id).await?;
    Ok(Json(DataResponse { data: standings }))
}

/// POST /api/v1/sessions/{id}/scores/refresh
pub async fn refresh_scores(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StudioStanding>>>> {
    let standings = scoring::refresh_scores(&state, id).await?;
    Ok(Json(DataResponse { data: standings }))
}

/// POST /api/v1/sessions/{id}/settle?cutoff=
pub async fn settle(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<SettleParams>,
) -> AppResult<Json<DataResponse<SettlementReport>>> {
    let cutoff = params.cutoff.unwrap_or_else(chrono::Utc::now);
    let report = settlement::settle_session(&state, id, cutoff).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/sessions/{id}/activity?limit=&offset=
pub async fn activity(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Activity>>>> {
    let entries = ActivityRepo::list_by_session(&state.pool, id, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: entries }))
}
