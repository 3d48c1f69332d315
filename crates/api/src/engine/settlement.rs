//! Sealed-bid settlement for a session.
//!
//! One pass per session at a time, guarded by a Postgres advisory lock. The
//! pass itself is computed by [`SettlementPass`]; each film it resolves is
//! persisted in its own transaction, so a failure on one film leaves the
//! earlier films committed and the failed film's bids pending for the next
//! pass. A failed win is reverted in the pass so later films are resolved
//! against the stored budgets and slots.

use std::collections::HashMap;

use bmb_core::activity;
use bmb_core::error::CoreError;
use bmb_core::settlement::{BidCandidate, BidOutcome, FilmResolution, HeldFilm, SettlementPass};
use bmb_core::studio::drop_refund;
use bmb_core::types::{Amount, DbId, FilmId, SlotPosition, Timestamp};
use bmb_db::locks::SettlementLock;
use bmb_db::models::activity::CreateActivity;
use bmb_db::models::film_bid::{BidAward, FilmResolutionWrite};
use bmb_db::models::league_session::LeagueSession;
use bmb_db::models::status::ActivityType;
use bmb_db::repositories::{ActivityRepo, FilmBidRepo, StudioFilmRepo, StudioRepo};
use bmb_events::RealtimeEvent;
use serde::Serialize;

use crate::engine::{film_or_placeholder, load_session};
use crate::error::AppResult;
use crate::state::AppState;

/// A bid that won its film during a pass.
#[derive(Debug, Clone, Serialize)]
pub struct SettledWin {
    pub bid_id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub amount: Amount,
    pub displaced_film_id: Option<FilmId>,
    pub budget_after: Amount,
}

/// Summary of one settlement pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettlementReport {
    pub session_id: DbId,
    pub films_resolved: usize,
    pub won: usize,
    pub lost: usize,
    pub invalid: usize,
    pub ignored: usize,
    /// Films whose write failed; their bids stay pending.
    pub failed: usize,
    pub winners: Vec<SettledWin>,
}

impl SettlementReport {
    fn count(&mut self, resolution: &FilmResolution) {
        for (_, outcome) in &resolution.outcomes {
            match outcome {
                BidOutcome::Won => self.won += 1,
                BidOutcome::Lost => self.lost += 1,
                BidOutcome::Invalid => self.invalid += 1,
                BidOutcome::Ignored => self.ignored += 1,
            }
        }
    }
}

/// Settle every pending bid of a session created at or before `cutoff`.
///
/// Fails with `CONFLICT` if another pass for the same session is running.
pub async fn settle_session(
    state: &AppState,
    session_id: DbId,
    cutoff: Timestamp,
) -> AppResult<SettlementReport> {
    let session = load_session(&state.pool, session_id).await?;

    let Some(lock) = SettlementLock::try_acquire(&state.pool, session_id).await? else {
        return Err(CoreError::Conflict(
            "A settlement pass is already running for this session".to_string(),
        )
        .into());
    };

    let result = run_pass(state, &session, cutoff).await;

    if let Err(e) = lock.release().await {
        tracing::warn!(session_id, error = %e, "Failed to release settlement lock");
    }
    result
}

async fn run_pass(
    state: &AppState,
    session: &LeagueSession,
    cutoff: Timestamp,
) -> AppResult<SettlementReport> {
    let session_id = session.id;
    let settings = &session.settings.0;
    let mut report = SettlementReport {
        session_id,
        ..Default::default()
    };

    let bids = FilmBidRepo::list_pending_for_settlement(&state.pool, session_id, cutoff).await?;
    if bids.is_empty() {
        tracing::debug!(session_id, "No pending bids to settle");
        return Ok(report);
    }

    let studios = StudioRepo::list_by_session(&state.pool, session_id).await?;
    let names: HashMap<DbId, String> = studios.iter().map(|s| (s.id, s.name.clone())).collect();
    let budgets: HashMap<DbId, Amount> = studios.iter().map(|s| (s.id, s.budget)).collect();

    let mode = settings.acquisition_mode();
    let holdings: HashMap<(DbId, SlotPosition), HeldFilm> =
        StudioFilmRepo::list_by_session(&state.pool, session_id)
            .await?
            .into_iter()
            .map(|sf| {
                let held = HeldFilm {
                    studio_film_id: sf.id,
                    film_id: sf.film_id,
                    refund: drop_refund(mode, sf.acquired_amount),
                };
                ((sf.studio_id, sf.slot), held)
            })
            .collect();

    let candidates: Vec<BidCandidate> = bids.iter().map(BidCandidate::from).collect();
    tracing::info!(session_id, bids = candidates.len(), %cutoff, "Settlement pass started");

    let mut pass = SettlementPass::new(candidates, budgets, holdings);
    while let Some(resolution) = pass.next() {
        report.films_resolved += 1;

        let mut write = FilmResolutionWrite {
            session_id,
            lost: resolution.bids_with(BidOutcome::Lost).collect(),
            invalid: resolution.bids_with(BidOutcome::Invalid).collect(),
            ignored: resolution.bids_with(BidOutcome::Ignored).collect(),
            ..Default::default()
        };

        if let Some(win) = &resolution.winner {
            let film = film_or_placeholder(state.films.as_ref(), win.film_id).await;
            let displaced_title = match win.displaced {
                Some(held) => Some(film_or_placeholder(state.films.as_ref(), held.film_id).await.title),
                None => None,
            };
            let studio_name = names.get(&win.studio_id).map(String::as_str).unwrap_or("A studio");
            let message = activity::bid_won(
                studio_name,
                &film.title,
                win.slot,
                settings.slot(win.slot).map(|d| d.slot_type),
                win.amount,
                displaced_title.as_deref(),
            );
            write.award = Some(BidAward {
                bid_id: win.bid_id,
                studio_id: win.studio_id,
                film_id: win.film_id,
                slot: win.slot,
                amount: win.amount,
                displaced_studio_film_id: win.displaced.map(|held| held.studio_film_id),
                refund: win.displaced.map(|held| held.refund).unwrap_or(0),
                activity_message: message,
            });
        }

        match FilmBidRepo::apply_resolution(&state.pool, &write).await {
            Ok(_) => {
                report.count(&resolution);
                if let Some(win) = resolution.winner {
                    tracing::info!(
                        session_id,
                        film_id = win.film_id,
                        studio_id = win.studio_id,
                        bid_id = win.bid_id,
                        amount = win.amount,
                        "Bid won"
                    );
                    let settled = SettledWin {
                        bid_id: win.bid_id,
                        studio_id: win.studio_id,
                        film_id: win.film_id,
                        slot: win.slot,
                        amount: win.amount,
                        displaced_film_id: win.displaced.map(|held| held.film_id),
                        budget_after: win.budget_after,
                    };
                    state
                        .event_bus
                        .publish(RealtimeEvent::bid_won(win.studio_id).with_data(&settled));
                    report.winners.push(settled);
                }
            }
            Err(e) => {
                report.failed += 1;
                if let Some(win) = &resolution.winner {
                    pass.revert(win);
                }
                tracing::error!(
                    session_id,
                    film_id = resolution.film_id,
                    error = %e,
                    "Failed to store film resolution; bids left pending"
                );
            }
        }
    }

    let summary = CreateActivity::new(
        session_id,
        ActivityType::Automated,
        activity::settlement_summary(report.films_resolved, report.winners.len()),
    );
    if let Err(e) = ActivityRepo::create(&state.pool, &summary).await {
        tracing::warn!(session_id, error = %e, "Failed to log settlement summary");
    }

    state
        .event_bus
        .publish(RealtimeEvent::bids_settled(session_id).with_data(&report));

    tracing::info!(
        session_id,
        films = report.films_resolved,
        won = report.won,
        lost = report.lost,
        invalid = report.invalid,
        ignored = report.ignored,
        failed = report.failed,
        "Settlement pass finished"
    );
    Ok(report)
}
