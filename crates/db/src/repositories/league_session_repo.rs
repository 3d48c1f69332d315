//! Repository for the `league_sessions` table.
//!
//! Draft progress lives on the session row. Every draft transition is a
//! conditional `UPDATE` on the expected state, so of two racing writers
//! exactly one sees `rows_affected() == 1`.

use bmb_core::session_settings::SessionSettings;
use bmb_core::types::{DbId, FilmId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::activity::CreateActivity;
use crate::models::league_session::{CreateLeagueSession, LeagueSession};
use crate::models::status::AcquiredType;
use crate::models::studio_film::{CreateStudioFilm, StudioFilm};
use crate::repositories::{ActivityRepo, StudioFilmRepo};

const COLUMNS: &str = "id, league_id, name, start_date, end_date, settings, \
    draft_started_at, draft_current_pick, draft_pick_started_at, draft_completed_at, \
    created_at, updated_at";

/// A pick to record against the pick number expected to be on the clock.
#[derive(Debug, Clone)]
pub struct RecordPick {
    pub session_id: DbId,
    pub expected_pick: i32,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: i32,
    pub picked_at: Timestamp,
    /// Whether this pick fills the final roster slot of the draft.
    pub completes_draft: bool,
    pub activities: Vec<CreateActivity>,
}

pub struct LeagueSessionRepo;

impl LeagueSessionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateLeagueSession,
    ) -> Result<LeagueSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO league_sessions (league_id, name, start_date, end_date, settings) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeagueSession>(&query)
            .bind(input.league_id)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(Json(&input.settings))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<LeagueSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM league_sessions WHERE id = $1");
        sqlx::query_as::<_, LeagueSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_league(
        pool: &PgPool,
        league_id: DbId,
    ) -> Result<Vec<LeagueSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM league_sessions WHERE league_id = $1 ORDER BY start_date, id"
        );
        sqlx::query_as::<_, LeagueSession>(&query)
            .bind(league_id)
            .fetch_all(pool)
            .await
    }

    /// Sessions whose draft has started but not completed.
    pub async fn list_active_drafts(pool: &PgPool) -> Result<Vec<LeagueSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM league_sessions \
             WHERE draft_started_at IS NOT NULL AND draft_completed_at IS NULL \
             ORDER BY id"
        );
        sqlx::query_as::<_, LeagueSession>(&query)
            .fetch_all(pool)
            .await
    }

    /// Replace settings while the draft has not started.
    ///
    /// Returns `None` if the session does not exist or its draft has begun.
    pub async fn update_settings(
        pool: &PgPool,
        id: DbId,
        settings: &SessionSettings,
    ) -> Result<Option<LeagueSession>, sqlx::Error> {
        let query = format!(
            "UPDATE league_sessions SET settings = $2, updated_at = NOW() \
             WHERE id = $1 AND draft_started_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeagueSession>(&query)
            .bind(id)
            .bind(Json(settings))
            .fetch_optional(pool)
            .await
    }

    /// Put pick 1 on the clock.
    ///
    /// Returns `None` if the draft was already started.
    pub async fn start_draft(
        pool: &PgPool,
        id: DbId,
        started_at: Timestamp,
        activity: &CreateActivity,
    ) -> Result<Option<LeagueSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE league_sessions \
             SET draft_started_at = $2, draft_current_pick = 1, \
                 draft_pick_started_at = $2, updated_at = NOW() \
             WHERE id = $1 AND draft_started_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let Some(session) = sqlx::query_as::<_, LeagueSession>(&query)
            .bind(id)
            .bind(started_at)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        ActivityRepo::insert_inner(&mut tx, activity).await?;
        tx.commit().await?;
        Ok(Some(session))
    }

    /// Record a draft pick if `expected_pick` is still on the clock.
    ///
    /// Advances the pick counter, restarts the clock, inserts the drafted
    /// film and appends the activity entries in one transaction. Returns
    /// `None` when another pick got there first.
    pub async fn record_pick(
        pool: &PgPool,
        pick: &RecordPick,
    ) -> Result<Option<(LeagueSession, StudioFilm)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE league_sessions \
             SET draft_current_pick = draft_current_pick + 1, \
                 draft_pick_started_at = $3, \
                 draft_completed_at = CASE WHEN $4 THEN $3 ELSE NULL END, \
                 updated_at = NOW() \
             WHERE id = $1 AND draft_current_pick = $2 \
               AND draft_started_at IS NOT NULL AND draft_completed_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let Some(session) = sqlx::query_as::<_, LeagueSession>(&query)
            .bind(pick.session_id)
            .bind(pick.expected_pick)
            .bind(pick.picked_at)
            .bind(pick.completes_draft)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let film = StudioFilmRepo::insert_inner(
            &mut tx,
            &CreateStudioFilm {
                studio_id: pick.studio_id,
                film_id: pick.film_id,
                slot: pick.slot,
                acquired_type_id: AcquiredType::Drafted.id(),
                acquired_amount: None,
            },
        )
        .await?;

        for activity in &pick.activities {
            ActivityRepo::insert_inner(&mut tx, activity).await?;
        }

        tx.commit().await?;
        Ok(Some((session, film)))
    }
}
