//! Repository for the `film_bids` table, including the per-film
//! settlement write.

use bmb_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::activity::CreateActivity;
use crate::models::film_bid::{CreateFilmBid, FilmBid, FilmResolutionWrite};
use crate::models::status::{AcquiredType, ActivityType, BidStatus, StatusId};
use crate::models::studio_film::{CreateStudioFilm, StudioFilm};
use crate::repositories::{ActivityRepo, StudioFilmRepo};

const COLUMNS: &str = "id, session_id, studio_id, film_id, slot, amount, status_id, \
    created_at, updated_at";

pub struct FilmBidRepo;

impl FilmBidRepo {
    pub async fn create(pool: &PgPool, input: &CreateFilmBid) -> Result<FilmBid, sqlx::Error> {
        let query = format!(
            "INSERT INTO film_bids (session_id, studio_id, film_id, slot, amount, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FilmBid>(&query)
            .bind(input.session_id)
            .bind(input.studio_id)
            .bind(input.film_id)
            .bind(input.slot)
            .bind(input.amount)
            .bind(BidStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FilmBid>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM film_bids WHERE id = $1");
        sqlx::query_as::<_, FilmBid>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A studio's bids, newest first.
    pub async fn list_by_studio(
        pool: &PgPool,
        studio_id: DbId,
    ) -> Result<Vec<FilmBid>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM film_bids WHERE studio_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, FilmBid>(&query)
            .bind(studio_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a bid only while it is still pending.
    ///
    /// Returns `true` if the bid was removed.
    pub async fn delete_pending(
        pool: &PgPool,
        id: DbId,
        studio_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM film_bids WHERE id = $1 AND studio_id = $2 AND status_id = $3",
        )
        .bind(id)
        .bind(studio_id)
        .bind(BidStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending bids created at or before `cutoff`, in settlement priority
    /// order (amount desc, created_at asc).
    pub async fn list_pending_for_settlement(
        pool: &PgPool,
        session_id: DbId,
        cutoff: Timestamp,
    ) -> Result<Vec<FilmBid>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM film_bids \
             WHERE session_id = $1 AND status_id = $2 AND created_at <= $3 \
             ORDER BY amount DESC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, FilmBid>(&query)
            .bind(session_id)
            .bind(BidStatus::Pending.id())
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Sessions with at least one pending bid created at or before `cutoff`.
    pub async fn sessions_with_pending(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT DISTINCT session_id FROM film_bids \
             WHERE status_id = $1 AND created_at <= $2 \
             ORDER BY session_id",
        )
        .bind(BidStatus::Pending.id())
        .bind(cutoff)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Persist the outcome of one resolved film atomically.
    ///
    /// Ignored bids are deleted; lost and invalid bids are marked. For the
    /// winner: the bid is marked won, any displaced film is removed, the
    /// budget is debited (and credited with the displacement refund), the
    /// new studio film is inserted and the win is logged. Fails with
    /// `RowNotFound` if the winning bid is no longer pending or the studio
    /// can no longer afford it.
    pub async fn apply_resolution(
        pool: &PgPool,
        write: &FilmResolutionWrite,
    ) -> Result<Option<StudioFilm>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !write.ignored.is_empty() {
            sqlx::query("DELETE FROM film_bids WHERE id = ANY($1) AND status_id = $2")
                .bind(&write.ignored)
                .bind(BidStatus::Pending.id())
                .execute(&mut *tx)
                .await?;
        }
        Self::mark_inner(&mut tx, &write.invalid, BidStatus::Invalid.id()).await?;
        Self::mark_inner(&mut tx, &write.lost, BidStatus::Lost.id()).await?;

        let Some(award) = &write.award else {
            tx.commit().await?;
            return Ok(None);
        };

        let marked = Self::mark_inner(&mut tx, &[award.bid_id], BidStatus::Won.id()).await?;
        if marked == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        if let Some(displaced) = award.displaced_studio_film_id {
            sqlx::query("DELETE FROM studio_films WHERE id = $1")
                .bind(displaced)
                .execute(&mut *tx)
                .await?;
        }

        let debited = sqlx::query(
            "UPDATE studios SET budget = budget - $2 + $3, updated_at = NOW() \
             WHERE id = $1 AND budget >= $2",
        )
        .bind(award.studio_id)
        .bind(award.amount)
        .bind(award.refund)
        .execute(&mut *tx)
        .await?;
        if debited.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let film = StudioFilmRepo::insert_inner(
            &mut tx,
            &CreateStudioFilm {
                studio_id: award.studio_id,
                film_id: award.film_id,
                slot: award.slot,
                acquired_type_id: AcquiredType::WonBid.id(),
                acquired_amount: Some(award.amount),
            },
        )
        .await?;

        ActivityRepo::insert_inner(
            &mut tx,
            &CreateActivity::new(write.session_id, ActivityType::BidWon, &award.activity_message)
                .studio(award.studio_id)
                .film(award.film_id),
        )
        .await?;

        tx.commit().await?;
        Ok(Some(film))
    }

    /// Move pending bids to a terminal status. Returns rows updated.
    async fn mark_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ids: &[DbId],
        status_id: StatusId,
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE film_bids SET status_id = $2, updated_at = NOW() \
             WHERE id = ANY($1) AND status_id = $3",
        )
        .bind(ids)
        .bind(status_id)
        .bind(BidStatus::Pending.id())
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
