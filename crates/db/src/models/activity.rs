//! Activity feed entries (`league_session_activities`). Append-only.

use bmb_core::types::{DbId, FilmId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{ActivityType, StatusId};

/// A row from the `league_session_activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub session_id: DbId,
    pub studio_id: Option<DbId>,
    pub film_id: Option<FilmId>,
    pub activity_type_id: StatusId,
    pub message: String,
    pub created_at: Timestamp,
}

/// DTO for appending an activity entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub session_id: DbId,
    pub studio_id: Option<DbId>,
    pub film_id: Option<FilmId>,
    pub activity_type_id: StatusId,
    pub message: String,
}

impl CreateActivity {
    pub fn new(session_id: DbId, activity_type: ActivityType, message: impl Into<String>) -> Self {
        Self {
            session_id,
            studio_id: None,
            film_id: None,
            activity_type_id: activity_type.id(),
            message: message.into(),
        }
    }

    pub fn studio(mut self, studio_id: DbId) -> Self {
        self.studio_id = Some(studio_id);
        self
    }

    pub fn film(mut self, film_id: FilmId) -> Self {
        self.film_id = Some(film_id);
        self
    }
}
