//! Draft clock: auto-picks for studios whose pick time ran out.
//!
//! Polls active drafts every `draft_clock_interval_secs`. An auto-pick goes
//! through the same guarded write as a voluntary pick, so a studio picking
//! at the last moment and the clock racing it cannot both land.

use std::time::Duration;

use bmb_core::error::CoreError;
use bmb_db::repositories::LeagueSessionRepo;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::engine::draft::auto_pick;
use crate::error::AppError;
use crate::state::AppState;

/// Check every active draft once and auto-pick where the clock expired.
pub async fn tick(state: &AppState) {
    let drafts = match LeagueSessionRepo::list_active_drafts(&state.pool).await {
        Ok(drafts) => drafts,
        Err(e) => {
            tracing::error!(error = %e, "Draft clock: failed to list active drafts");
            return;
        }
    };

    let now = Utc::now();
    for session in &drafts {
        match auto_pick(state, session, now).await {
            Ok(Some(view)) => tracing::debug!(
                session_id = session.id,
                picks_made = view.picks_made,
                "Draft clock: auto-pick recorded"
            ),
            Ok(None) => {}
            Err(AppError::Core(CoreError::Conflict(msg))) => {
                tracing::debug!(session_id = session.id, reason = %msg, "Draft clock: pick raced");
            }
            Err(e) => {
                tracing::error!(session_id = session.id, error = %e, "Draft clock: auto-pick failed");
            }
        }
    }
}

/// Run the draft clock loop until `cancel` is triggered.
pub async fn run(state: AppState, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Draft clock started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Draft clock stopping");
                break;
            }
            _ = ticker.tick() => {
                tick(&state).await;
            }
        }
    }
}
