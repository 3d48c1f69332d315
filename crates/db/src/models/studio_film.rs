//! Studio film (one film in one roster slot) model and DTOs.

use bmb_core::types::{Amount, DbId, FilmId, SlotPosition, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `studio_films` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudioFilm {
    pub id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub acquired_at: Timestamp,
    pub acquired_type_id: StatusId,
    /// Price paid, when the film was bought.
    pub acquired_amount: Option<Amount>,
    pub score_override: Option<f64>,
    pub created_at: Timestamp,
}

/// DTO for placing a film in a slot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudioFilm {
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub acquired_type_id: StatusId,
    pub acquired_amount: Option<Amount>,
}

/// A studio film joined with the session it belongs to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionStudioFilm {
    pub id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub acquired_type_id: StatusId,
    pub acquired_amount: Option<Amount>,
    pub score_override: Option<f64>,
}
