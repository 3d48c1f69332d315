//! League entity model and DTOs.

use bmb_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `leagues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct League {
    pub id: DbId,
    pub name: String,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a league.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeague {
    pub name: String,
    pub owner_id: DbId,
}
