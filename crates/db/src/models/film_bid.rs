//! Sealed bid model, DTOs and settlement write sets.

use bmb_core::settlement::BidCandidate;
use bmb_core::types::{Amount, DbId, FilmId, SlotPosition, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `film_bids` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FilmBid {
    pub id: DbId,
    pub session_id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub amount: Amount,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&FilmBid> for BidCandidate {
    fn from(bid: &FilmBid) -> Self {
        BidCandidate {
            bid_id: bid.id,
            studio_id: bid.studio_id,
            film_id: bid.film_id,
            slot: bid.slot,
            amount: bid.amount,
            created_at: bid.created_at,
        }
    }
}

/// DTO for placing a bid.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFilmBid {
    pub session_id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub amount: Amount,
}

/// Roster and budget changes for the winner of one film.
#[derive(Debug, Clone)]
pub struct BidAward {
    pub bid_id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub amount: Amount,
    /// Film currently in the target slot, removed before the new one lands.
    pub displaced_studio_film_id: Option<DbId>,
    /// Budget returned for the displaced film.
    pub refund: Amount,
    pub activity_message: String,
}

/// Everything written for one resolved film, applied in one transaction.
#[derive(Debug, Clone, Default)]
pub struct FilmResolutionWrite {
    pub session_id: DbId,
    pub award: Option<BidAward>,
    pub lost: Vec<DbId>,
    pub invalid: Vec<DbId>,
    /// Deleted rather than marked.
    pub ignored: Vec<DbId>,
}
