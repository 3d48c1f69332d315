//! Repository for the `studio_films` table.
//!
//! The `(studio_id, slot)` unique constraint is deferred to commit, so
//! swaps update both rows inside one transaction without a temporary slot.

use bmb_core::studio::SlotMove;
use bmb_core::types::{Amount, DbId, FilmId, SlotPosition};
use sqlx::PgPool;

use crate::models::activity::CreateActivity;
use crate::models::studio_film::{CreateStudioFilm, SessionStudioFilm, StudioFilm};
use crate::repositories::{ActivityRepo, StudioRepo};

const COLUMNS: &str = "id, studio_id, film_id, slot, acquired_at, acquired_type_id, \
    acquired_amount, score_override, created_at";

pub struct StudioFilmRepo;

impl StudioFilmRepo {
    /// A studio's roster ordered by slot.
    pub async fn list_by_studio(
        pool: &PgPool,
        studio_id: DbId,
    ) -> Result<Vec<StudioFilm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM studio_films WHERE studio_id = $1 ORDER BY slot");
        sqlx::query_as::<_, StudioFilm>(&query)
            .bind(studio_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_slot(
        pool: &PgPool,
        studio_id: DbId,
        slot: SlotPosition,
    ) -> Result<Option<StudioFilm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM studio_films WHERE studio_id = $1 AND slot = $2");
        sqlx::query_as::<_, StudioFilm>(&query)
            .bind(studio_id)
            .bind(slot)
            .fetch_optional(pool)
            .await
    }

    /// Every rostered film across all studios of a session.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<SessionStudioFilm>, sqlx::Error> {
        sqlx::query_as::<_, SessionStudioFilm>(
            "SELECT sf.id, sf.studio_id, sf.film_id, sf.slot, sf.acquired_type_id, \
                    sf.acquired_amount, sf.score_override \
             FROM studio_films sf \
             JOIN studios s ON s.id = sf.studio_id \
             WHERE s.session_id = $1 \
             ORDER BY sf.studio_id, sf.slot",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    pub async fn studio_holds_film(
        pool: &PgPool,
        studio_id: DbId,
        film_id: FilmId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM studio_films WHERE studio_id = $1 AND film_id = $2)",
        )
        .bind(studio_id)
        .bind(film_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Apply a planned swap and log one activity per moved film.
    pub async fn apply_moves(
        pool: &PgPool,
        studio_id: DbId,
        moves: &[SlotMove],
        activities: &[CreateActivity],
    ) -> Result<Vec<StudioFilm>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE studio_films SET slot = $3 \
             WHERE id = $1 AND studio_id = $2 AND slot = $4 \
             RETURNING {COLUMNS}"
        );
        let mut moved = Vec::with_capacity(moves.len());
        for m in moves {
            let film = sqlx::query_as::<_, StudioFilm>(&query)
                .bind(m.studio_film_id)
                .bind(studio_id)
                .bind(m.to)
                .bind(m.from)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            moved.push(film);
        }

        for activity in activities {
            ActivityRepo::insert_inner(&mut tx, activity).await?;
        }

        tx.commit().await?;
        Ok(moved)
    }

    /// Remove a film from a roster and credit `refund` to the studio.
    ///
    /// Returns `None` if the film is not on that studio's roster.
    pub async fn drop_film(
        pool: &PgPool,
        studio_id: DbId,
        studio_film_id: DbId,
        refund: Amount,
        activity: &CreateActivity,
    ) -> Result<Option<StudioFilm>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "DELETE FROM studio_films WHERE id = $1 AND studio_id = $2 RETURNING {COLUMNS}"
        );
        let Some(dropped) = sqlx::query_as::<_, StudioFilm>(&query)
            .bind(studio_film_id)
            .bind(studio_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if refund > 0 {
            StudioRepo::adjust_budget_inner(&mut tx, studio_id, refund).await?;
        }
        ActivityRepo::insert_inner(&mut tx, activity).await?;

        tx.commit().await?;
        Ok(Some(dropped))
    }

    /// Insert a studio film within an existing transaction.
    pub(crate) async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateStudioFilm,
    ) -> Result<StudioFilm, sqlx::Error> {
        let query = format!(
            "INSERT INTO studio_films (studio_id, film_id, slot, acquired_type_id, acquired_amount) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudioFilm>(&query)
            .bind(input.studio_id)
            .bind(input.film_id)
            .bind(input.slot)
            .bind(input.acquired_type_id)
            .bind(input.acquired_amount)
            .fetch_one(&mut **tx)
            .await
    }
}
