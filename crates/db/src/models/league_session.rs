//! League session model.
//!
//! Settings are stored as JSONB and decoded straight into the typed
//! [`SessionSettings`] struct by `sqlx::types::Json`.

use bmb_core::draft::DraftState;
use bmb_core::session_settings::SessionSettings;
use bmb_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// A row from the `league_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeagueSession {
    pub id: DbId,
    pub league_id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub settings: Json<SessionSettings>,
    pub draft_started_at: Option<Timestamp>,
    /// 1-based pick on the clock; 0 before the draft starts.
    pub draft_current_pick: i32,
    pub draft_pick_started_at: Option<Timestamp>,
    pub draft_completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LeagueSession {
    pub fn draft_has_started(&self) -> bool {
        self.draft_started_at.is_some()
    }

    /// Picks recorded so far.
    pub fn picks_made(&self) -> u32 {
        (self.draft_current_pick - 1).max(0) as u32
    }

    /// Rebuild the draft state from the bookkeeping columns.
    pub fn draft_state(&self) -> DraftState {
        let clock = self
            .draft_started_at
            .map(|started| self.draft_pick_started_at.unwrap_or(started));
        DraftState::compute(&self.settings, self.picks_made(), clock)
    }
}

/// DTO for creating a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeagueSession {
    pub league_id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub settings: SessionSettings,
}
