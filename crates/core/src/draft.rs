//! Live draft turn logic.
//!
//! A draft is fully described by its settings, whether it has started, how
//! many picks have been made and when the current pick's clock started.
//! [`DraftState::compute`] rebuilds everything else from those facts, so the
//! persisted state never needs to store whose turn it is.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::film::FilmDetails;
use crate::session_settings::{DraftType, SessionSettings};
use crate::types::{DbId, FilmId, SlotPosition, Timestamp};

/// Coarse lifecycle of a session's draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DraftPhase {
    NotStarted,
    InProgress,
    Complete,
}

/// The pick currently on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PickTurn {
    /// 1-based overall pick number.
    pub num: u32,
    /// Owner whose studio is on the clock.
    pub owner_id: DbId,
    pub start_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
}

impl PickTurn {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.end_timestamp
    }
}

/// Derived view of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftState {
    pub phase: DraftPhase,
    pub picks_made: u32,
    pub total_picks: u32,
    pub current_pick: Option<PickTurn>,
}

/// Total picks in a draft: one per slot per studio.
pub fn total_picks(slot_count: usize, studio_count: usize) -> u32 {
    (slot_count * studio_count) as u32
}

/// 1-based round of a 1-based pick number.
pub fn round_for_pick(pick: u32, studio_count: usize) -> u32 {
    let n = studio_count as u32;
    pick.div_ceil(n)
}

/// Owner on the clock for `pick` (1-based).
///
/// Snake drafts reverse direction every round: for `[A, B, C]`, picks 1..=6
/// go `A, B, C, C, B, A`. Linear drafts repeat the order each round.
pub fn owner_for_pick(order: &[DbId], pick: u32, draft_type: DraftType) -> Option<DbId> {
    if order.is_empty() || pick == 0 {
        return None;
    }
    let n = order.len() as u32;
    match draft_type {
        DraftType::Linear => order.get(((pick - 1) % n) as usize).copied(),
        DraftType::Snake => {
            let round = round_for_pick(pick, order.len());
            let index = (round * n - pick) as usize;
            if round % 2 == 0 {
                order.get(index).copied()
            } else {
                order.iter().rev().nth(index).copied()
            }
        }
    }
}

impl DraftState {
    /// Rebuild the draft state.
    ///
    /// `pick_started_at` is when the current pick's clock started (the draft
    /// start for pick 1, otherwise the previous pick's time). `None` means
    /// the draft has not been started.
    pub fn compute(
        settings: &SessionSettings,
        picks_made: u32,
        pick_started_at: Option<Timestamp>,
    ) -> Self {
        let order = &settings.draft.order;
        let total = total_picks(settings.slot_count(), order.len());

        let Some(started_at) = pick_started_at else {
            return Self {
                phase: DraftPhase::NotStarted,
                picks_made,
                total_picks: total,
                current_pick: None,
            };
        };

        if picks_made >= total {
            return Self {
                phase: DraftPhase::Complete,
                picks_made,
                total_picks: total,
                current_pick: None,
            };
        }

        let num = picks_made + 1;
        let current_pick = owner_for_pick(order, num, settings.draft.draft_type).map(|owner_id| {
            PickTurn {
                num,
                owner_id,
                start_timestamp: started_at,
                end_timestamp: started_at
                    + chrono::Duration::seconds(i64::from(settings.draft.time_per_round)),
            }
        });

        Self {
            phase: DraftPhase::InProgress,
            picks_made,
            total_picks: total,
            current_pick,
        }
    }

    /// Whether the pick after this one completes the draft.
    pub fn is_last_pick(&self) -> bool {
        self.picks_made + 1 == self.total_picks
    }
}

/// Slot positions not yet filled, ascending.
pub fn open_slots(settings: &SessionSettings, occupied: &HashSet<SlotPosition>) -> Vec<SlotPosition> {
    settings
        .positions()
        .into_iter()
        .filter(|p| !occupied.contains(p))
        .collect()
}

/// Everything needed to decide whether a voluntary pick is allowed.
pub struct PickRequest<'a> {
    pub state: &'a DraftState,
    pub settings: &'a SessionSettings,
    pub acting_owner_id: DbId,
    pub slot: SlotPosition,
    pub occupied_slots: &'a HashSet<SlotPosition>,
    pub film_already_drafted: bool,
}

/// Check the hardened pick invariants and return the turn being used.
pub fn validate_pick(request: &PickRequest<'_>) -> Result<PickTurn, CoreError> {
    let turn = match request.state.phase {
        DraftPhase::NotStarted => {
            return Err(CoreError::Conflict("The draft has not started".to_string()))
        }
        DraftPhase::Complete => {
            return Err(CoreError::Conflict("The draft is complete".to_string()))
        }
        DraftPhase::InProgress => request.state.current_pick.ok_or_else(|| {
            CoreError::Internal("Draft in progress without a current pick".to_string())
        })?,
    };

    if turn.owner_id != request.acting_owner_id {
        return Err(CoreError::NotYourTurn(format!(
            "Pick {} belongs to another studio",
            turn.num
        )));
    }

    request.settings.require_slot(request.slot)?;

    if request.occupied_slots.contains(&request.slot) {
        return Err(CoreError::Conflict(format!(
            "Slot {} is already filled",
            request.slot
        )));
    }

    if request.film_already_drafted {
        return Err(CoreError::Conflict(
            "That film has already been drafted".to_string(),
        ));
    }

    Ok(turn)
}

/// Pick for a studio whose clock ran out: the most popular undrafted film
/// goes into the lowest open slot.
///
/// Films without a popularity figure rank last; ties fall back to film id.
pub fn choose_auto_pick(
    candidates: &[FilmDetails],
    drafted: &HashSet<FilmId>,
    open_slots: &[SlotPosition],
) -> Option<(FilmId, SlotPosition)> {
    let slot = open_slots.iter().min().copied()?;
    let mut ranked: Vec<&FilmDetails> = candidates
        .iter()
        .filter(|film| !drafted.contains(&film.id))
        .collect();
    ranked.sort_by(|a, b| {
        let pa = a.popularity.unwrap_or(f64::NEG_INFINITY);
        let pb = b.popularity.unwrap_or(f64::NEG_INFINITY);
        pb.total_cmp(&pa).then(a.id.cmp(&b.id))
    });
    ranked.first().map(|film| (film.id, slot))
}
