//! Studio roster rules: drop refunds, slot swaps and standings.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::session_settings::{AcquisitionMode, SessionSettings};
use crate::types::{Amount, DbId, SlotPosition};

/// Share of the acquisition price returned when a film is dropped in a
/// bid-war session.
pub const DROP_REFUND_PERCENT: Amount = 80;

/// Budget returned when dropping a film bought for `acquired_amount`.
///
/// Bid-war sessions refund 80% rounded down; draft sessions refund nothing.
/// Films with no recorded price (drafted, traded, admin-added) refund 0.
pub fn drop_refund(mode: AcquisitionMode, acquired_amount: Option<Amount>) -> Amount {
    match mode {
        AcquisitionMode::Draft => 0,
        AcquisitionMode::BidWar => acquired_amount
            .map(|amount| amount.max(0) * DROP_REFUND_PERCENT / 100)
            .unwrap_or(0),
    }
}

/// A single slot change produced by [`plan_swap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotMove {
    pub studio_film_id: DbId,
    pub from: SlotPosition,
    pub to: SlotPosition,
}

/// Plan moving the film in `from` into `to`.
///
/// If `to` is occupied the two films trade places (two moves); otherwise the
/// film simply moves into the empty slot. `roster` maps slot position to the
/// studio-film id occupying it.
pub fn plan_swap(
    settings: &SessionSettings,
    roster: &HashMap<SlotPosition, DbId>,
    from: SlotPosition,
    to: SlotPosition,
) -> Result<Vec<SlotMove>, CoreError> {
    if from == to {
        return Err(CoreError::Validation(
            "Source and target slots must differ".to_string(),
        ));
    }
    settings.require_slot(from)?;
    settings.require_slot(to)?;

    let moving = roster.get(&from).copied().ok_or_else(|| {
        CoreError::Validation(format!("Slot {from} is empty; nothing to move"))
    })?;

    let mut moves = vec![SlotMove {
        studio_film_id: moving,
        from,
        to,
    }];
    if let Some(&other) = roster.get(&to) {
        moves.push(SlotMove {
            studio_film_id: other,
            from: to,
            to: from,
        });
    }
    Ok(moves)
}

/// A studio's place in the session standings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standing {
    pub studio_id: DbId,
    pub score: f64,
    pub rank: u32,
}

/// Sort studios by score (descending) and assign competition ranks.
///
/// Ties keep their input order and share the rank of the first studio in the
/// tie, so scores `[90, 80, 80, 70]` rank `1, 2, 2, 4`.
pub fn rank_standings(scores: &[(DbId, f64)]) -> Vec<Standing> {
    let mut sorted: Vec<(DbId, f64)> = scores.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut standings: Vec<Standing> = Vec::with_capacity(sorted.len());
    for (index, (studio_id, score)) in sorted.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(prev) if prev.score == score => prev.rank,
            _ => index as u32 + 1,
        };
        standings.push(Standing {
            studio_id,
            score,
            rank,
        });
    }
    standings
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::scoring::SlotType;
    use crate::session_settings::{DraftSettings, DraftType, SlotDefinition};

    fn settings() -> SessionSettings {
        SessionSettings {
            team_structure: (1..=3)
                .map(|position| SlotDefinition {
                    slot_type: SlotType::TotalBoxOffice,
                    position,
                })
                .collect(),
            draft: DraftSettings {
                conduct: false,
                date: None,
                order: vec![],
                num_rounds: 0,
                time_per_round: 0,
                draft_type: DraftType::Snake,
            },
            starting_budget: 100,
        }
    }

    // -- drop refund ----------------------------------------------------------

    #[test]
    fn bid_war_refunds_eighty_percent_rounded_down() {
        assert_eq!(drop_refund(AcquisitionMode::BidWar, Some(50)), 40);
        assert_eq!(drop_refund(AcquisitionMode::BidWar, Some(33)), 26);
        assert_eq!(drop_refund(AcquisitionMode::BidWar, Some(1)), 0);
    }

    #[test]
    fn draft_mode_refunds_nothing() {
        assert_eq!(drop_refund(AcquisitionMode::Draft, Some(50)), 0);
    }

    #[test]
    fn unpriced_film_refunds_nothing() {
        assert_eq!(drop_refund(AcquisitionMode::BidWar, None), 0);
    }

    // -- swaps ----------------------------------------------------------------

    #[test]
    fn swap_two_occupied_slots() {
        let roster: HashMap<SlotPosition, DbId> = [(1, 100), (2, 200)].into_iter().collect();
        let moves = plan_swap(&settings(), &roster, 1, 2).unwrap();
        assert_eq!(
            moves,
            vec![
                SlotMove { studio_film_id: 100, from: 1, to: 2 },
                SlotMove { studio_film_id: 200, from: 2, to: 1 },
            ]
        );
    }

    #[test]
    fn move_into_empty_slot() {
        let roster: HashMap<SlotPosition, DbId> = [(1, 100)].into_iter().collect();
        let moves = plan_swap(&settings(), &roster, 1, 3).unwrap();
        assert_eq!(moves, vec![SlotMove { studio_film_id: 100, from: 1, to: 3 }]);
    }

    #[test]
    fn swap_rejects_empty_source_unknown_slot_and_same_slot() {
        let roster: HashMap<SlotPosition, DbId> = [(1, 100)].into_iter().collect();
        assert_matches!(plan_swap(&settings(), &roster, 2, 1), Err(CoreError::Validation(_)));
        assert_matches!(plan_swap(&settings(), &roster, 1, 9), Err(CoreError::Validation(_)));
        assert_matches!(plan_swap(&settings(), &roster, 1, 1), Err(CoreError::Validation(_)));
    }

    // -- standings ------------------------------------------------------------

    #[test]
    fn ties_share_first_rank_and_skip() {
        let standings = rank_standings(&[(1, 80.0), (2, 90.0), (3, 80.0), (4, 70.0)]);
        let ranks: Vec<(DbId, u32)> = standings.iter().map(|s| (s.studio_id, s.rank)).collect();
        assert_eq!(ranks, vec![(2, 1), (1, 2), (3, 2), (4, 4)]);
    }

    #[test]
    fn empty_standings() {
        assert!(rank_standings(&[]).is_empty());
    }
}
