//! Repository for the `leagues` table.

use bmb_core::types::DbId;
use sqlx::PgPool;

use crate::models::league::{CreateLeague, League};

const COLUMNS: &str = "id, name, owner_id, created_at, updated_at";

pub struct LeagueRepo;

impl LeagueRepo {
    pub async fn create(pool: &PgPool, input: &CreateLeague) -> Result<League, sqlx::Error> {
        let query = format!(
            "INSERT INTO leagues (name, owner_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, League>(&query)
            .bind(&input.name)
            .bind(input.owner_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<League>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leagues WHERE id = $1");
        sqlx::query_as::<_, League>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
