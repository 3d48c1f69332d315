//! Weekly settlement of pending bids.
//!
//! Bids placed before the weekly cutoff are settled at the cutoff. On
//! startup the most recent cutoff is processed once to catch up on a pass
//! missed while the server was down; re-running a cutoff is harmless since
//! settled bids are no longer pending.

use bmb_core::error::CoreError;
use bmb_db::repositories::FilmBidRepo;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::config::SettlementSchedule;
use crate::engine::settlement::settle_session;
use crate::error::AppError;
use crate::state::AppState;

/// The latest scheduled instant at or before `now`.
pub fn most_recent_slot(now: DateTime<Utc>, schedule: SettlementSchedule) -> DateTime<Utc> {
    let days_back = (now.weekday().num_days_from_monday() + 7
        - schedule.weekday.num_days_from_monday())
        % 7;
    let time = NaiveTime::from_hms_opt(schedule.hour_utc, 0, 0).unwrap_or(NaiveTime::MIN);
    let candidate = (now.date_naive() - Duration::days(i64::from(days_back)))
        .and_time(time)
        .and_utc();
    if candidate > now {
        candidate - Duration::weeks(1)
    } else {
        candidate
    }
}

/// The first scheduled instant strictly after `now`.
pub fn next_slot(now: DateTime<Utc>, schedule: SettlementSchedule) -> DateTime<Utc> {
    most_recent_slot(now, schedule) + Duration::weeks(1)
}

/// Settle every session with pending bids created at or before `cutoff`.
///
/// Failures are logged per session; one session's error never stops the
/// others.
pub async fn settle_due(state: &AppState, cutoff: DateTime<Utc>) {
    let sessions = match FilmBidRepo::sessions_with_pending(&state.pool, cutoff).await {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::error!(error = %e, "Scheduled settlement: failed to list sessions");
            return;
        }
    };
    if sessions.is_empty() {
        tracing::debug!(%cutoff, "Scheduled settlement: nothing pending");
        return;
    }

    for session_id in sessions {
        match settle_session(state, session_id, cutoff).await {
            Ok(report) => tracing::info!(
                session_id,
                films = report.films_resolved,
                won = report.won,
                "Scheduled settlement complete"
            ),
            Err(AppError::Core(CoreError::Conflict(_))) => {
                tracing::info!(session_id, "Scheduled settlement skipped, pass already running");
            }
            Err(e) => {
                tracing::error!(session_id, error = %e, "Scheduled settlement failed");
            }
        }
    }
}

/// Run the weekly settlement loop until `cancel` is triggered.
pub async fn run(state: AppState, schedule: SettlementSchedule, cancel: CancellationToken) {
    tracing::info!(
        weekday = %schedule.weekday,
        hour_utc = schedule.hour_utc,
        "Settlement scheduler started"
    );

    settle_due(&state, most_recent_slot(Utc::now(), schedule)).await;

    loop {
        let next = next_slot(Utc::now(), schedule);
        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        tracing::debug!(%next, "Next settlement scheduled");

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Settlement scheduler stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                settle_due(&state, next).await;
            }
        }
    }
}
