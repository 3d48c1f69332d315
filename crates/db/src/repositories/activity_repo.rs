//! Repository for the append-only `league_session_activities` table.

use bmb_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, CreateActivity};

const COLUMNS: &str = "id, session_id, studio_id, film_id, activity_type_id, message, created_at";

/// Maximum page size for the activity feed.
const MAX_LIMIT: i64 = 200;

/// Default page size for the activity feed.
const DEFAULT_LIMIT: i64 = 50;

pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let activity = Self::insert_inner(&mut tx, input).await?;
        tx.commit().await?;
        Ok(activity)
    }

    /// Newest first.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM league_session_activities \
             WHERE session_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(session_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Append an entry within an existing transaction.
    pub(crate) async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateActivity,
    ) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO league_session_activities \
                 (session_id, studio_id, film_id, activity_type_id, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.session_id)
            .bind(input.studio_id)
            .bind(input.film_id)
            .bind(input.activity_type_id)
            .bind(&input.message)
            .fetch_one(&mut **tx)
            .await
    }
}
