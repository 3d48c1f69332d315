//! League engines.
//!
//! Each submodule owns one workflow (bidding, settlement, the live draft,
//! roster changes, scoring) and is shared by the HTTP handlers and the
//! background tasks. Engines validate with `bmb_core`, persist through
//! `bmb_db` repositories and publish real-time events best-effort after the
//! write has committed.

pub mod bidding;
pub mod draft;
pub mod roster;
pub mod scoring;
pub mod settlement;

use bmb_core::film::FilmDetails;
use bmb_core::types::{DbId, FilmId};
use bmb_db::models::league_session::LeagueSession;
use bmb_db::models::studio::Studio;
use bmb_db::repositories::{LeagueSessionRepo, StudioRepo};
use bmb_db::DbPool;
use bmb_filmdb::FilmMetadataSource;

use crate::error::{AppError, AppResult};

pub(crate) async fn load_session(pool: &DbPool, session_id: DbId) -> AppResult<LeagueSession> {
    LeagueSessionRepo::find_by_id(pool, session_id)
        .await?
        .ok_or(AppError::not_found("LeagueSession", session_id))
}

pub(crate) async fn load_studio(pool: &DbPool, studio_id: DbId) -> AppResult<Studio> {
    StudioRepo::find_by_id(pool, studio_id)
        .await?
        .ok_or(AppError::not_found("Studio", studio_id))
}

/// Film metadata, or a zero-scoring placeholder when the provider fails.
pub(crate) async fn film_or_placeholder(
    films: &dyn FilmMetadataSource,
    film_id: FilmId,
) -> FilmDetails {
    match films.film_details(film_id).await {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!(film_id, error = %e, "Film data unavailable, using placeholder");
            FilmDetails::unavailable(film_id)
        }
    }
}
