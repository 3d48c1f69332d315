//! Repository for the `studios` table.

use bmb_core::types::{Amount, DbId};
use sqlx::PgPool;

use crate::models::studio::{CreateStudio, Studio};

const COLUMNS: &str = "id, session_id, owner_id, name, icon, budget, score, created_at, updated_at";

pub struct StudioRepo;

impl StudioRepo {
    /// Insert a studio with its opening budget.
    ///
    /// Fails with the `uq_studios_session_owner` unique violation if the
    /// owner already has a studio in the session.
    pub async fn create(
        pool: &PgPool,
        input: &CreateStudio,
        starting_budget: Amount,
    ) -> Result<Studio, sqlx::Error> {
        let query = format!(
            "INSERT INTO studios (session_id, owner_id, name, icon, budget) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Studio>(&query)
            .bind(input.session_id)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.icon)
            .bind(starting_budget)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Studio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM studios WHERE id = $1");
        sqlx::query_as::<_, Studio>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_owner(
        pool: &PgPool,
        session_id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Studio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM studios WHERE session_id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Studio>(&query)
            .bind(session_id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// All studios in a session in creation order.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<Studio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM studios WHERE session_id = $1 ORDER BY id");
        sqlx::query_as::<_, Studio>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update_score(pool: &PgPool, id: DbId, score: f64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE studios SET score = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Add `delta` (possibly negative) to a studio's budget.
    pub(crate) async fn adjust_budget_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        delta: Amount,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            "UPDATE studios SET budget = budget + $2, updated_at = NOW() \
             WHERE id = $1 AND budget + $2 >= 0",
        )
        .bind(id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
}
