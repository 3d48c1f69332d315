//! Studio (a participant's roster within a session) model and DTOs.

use bmb_core::types::{Amount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `studios` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Studio {
    pub id: DbId,
    pub session_id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub icon: Option<String>,
    pub budget: Amount,
    /// Last computed total; refreshed by the scoring pass.
    pub score: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a studio. The budget comes from session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudio {
    pub session_id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub icon: Option<String>,
}
