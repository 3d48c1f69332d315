//! Sealed-bid settlement.
//!
//! A settlement pass resolves every pending bid of a session into a terminal
//! outcome. Films are resolved one at a time; the next film is always the
//! one holding the highest remaining bid. Slot contention is decided inside
//! each film's resolution, never when choosing which film goes next.
//!
//! [`SettlementPass`] is an iterator of [`FilmResolution`]s. It owns an
//! in-memory copy of every studio's budget and occupied slots, so callers can
//! persist each resolution as it is produced and a failure part-way through
//! leaves earlier resolutions committed.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::{Amount, DbId, FilmId, SlotPosition, Timestamp};

/// A pending bid as seen by the settlement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidCandidate {
    pub bid_id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub amount: Amount,
    pub created_at: Timestamp,
}

/// A film currently occupying a studio slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeldFilm {
    pub studio_film_id: DbId,
    pub film_id: FilmId,
    /// Budget returned to the studio if this film is dropped.
    pub refund: Amount,
}

/// Terminal outcome assigned to a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BidOutcome {
    Won,
    Lost,
    /// The studio could not afford the bid when it was reached.
    Invalid,
    /// The studio already won another film for the same slot this pass.
    Ignored,
}

/// The winning bid of a film together with its roster side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinningBid {
    pub bid_id: DbId,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub amount: Amount,
    /// Film evicted from the target slot, dropped before the winner lands.
    pub displaced: Option<HeldFilm>,
    pub budget_before: Amount,
    pub budget_after: Amount,
}

/// Everything decided about one film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmResolution {
    pub film_id: FilmId,
    pub winner: Option<WinningBid>,
    /// Outcome for every bid on the film, in priority order.
    pub outcomes: Vec<(DbId, BidOutcome)>,
}

impl FilmResolution {
    pub fn bids_with(&self, outcome: BidOutcome) -> impl Iterator<Item = DbId> + '_ {
        self.outcomes
            .iter()
            .filter(move |(_, o)| *o == outcome)
            .map(|(id, _)| *id)
    }
}

/// Iterator over the films of one settlement pass.
#[derive(Debug, Clone)]
pub struct SettlementPass {
    /// Unresolved bids in priority order.
    remaining: Vec<BidCandidate>,
    budgets: HashMap<DbId, Amount>,
    holdings: HashMap<(DbId, SlotPosition), HeldFilm>,
    won_slots: HashSet<(DbId, SlotPosition)>,
}

/// Amount descending, then creation time ascending, then id for stability.
fn priority_order(a: &BidCandidate, b: &BidCandidate) -> std::cmp::Ordering {
    b.amount
        .cmp(&a.amount)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.bid_id.cmp(&b.bid_id))
}

impl SettlementPass {
    /// Build a pass over `bids`.
    ///
    /// `budgets` maps studio id to its current budget; a studio missing from
    /// the map is treated as having nothing to spend. `holdings` maps
    /// `(studio_id, slot)` to the film currently in that slot.
    pub fn new(
        mut bids: Vec<BidCandidate>,
        budgets: HashMap<DbId, Amount>,
        holdings: HashMap<(DbId, SlotPosition), HeldFilm>,
    ) -> Self {
        bids.sort_by(priority_order);
        Self {
            remaining: bids,
            budgets,
            holdings,
            won_slots: HashSet::new(),
        }
    }

    /// A studio's budget as of the resolutions produced so far.
    pub fn budget(&self, studio_id: DbId) -> Amount {
        self.budgets.get(&studio_id).copied().unwrap_or(0)
    }

    /// Number of bids not yet resolved.
    pub fn remaining_bids(&self) -> usize {
        self.remaining.len()
    }

    fn is_contended(&self, bid: &BidCandidate) -> bool {
        self.won_slots.contains(&(bid.studio_id, bid.slot))
    }

    /// The film holding the highest remaining bid.
    fn next_film(&self) -> Option<FilmId> {
        self.remaining.first().map(|bid| bid.film_id)
    }

    /// Undo a win whose write failed, restoring the studio's budget, the
    /// displaced film and the slot so later films see the stored state.
    ///
    /// Bids of the reverted film are not re-queued; they stay pending in
    /// storage for the next pass.
    pub fn revert(&mut self, win: &WinningBid) {
        self.budgets.insert(win.studio_id, win.budget_before);
        self.won_slots.remove(&(win.studio_id, win.slot));
        if let Some(held) = win.displaced {
            self.holdings.insert((win.studio_id, win.slot), held);
        }
    }

    fn resolve(&mut self, film_id: FilmId, bids: Vec<BidCandidate>) -> FilmResolution {
        let mut outcomes = Vec::with_capacity(bids.len());
        let mut winner: Option<WinningBid> = None;

        for bid in bids {
            if self.is_contended(&bid) {
                outcomes.push((bid.bid_id, BidOutcome::Ignored));
                continue;
            }
            if winner.is_some() {
                outcomes.push((bid.bid_id, BidOutcome::Lost));
                continue;
            }

            let budget_before = self.budget(bid.studio_id);
            if budget_before < bid.amount {
                outcomes.push((bid.bid_id, BidOutcome::Invalid));
                continue;
            }

            let displaced = self.holdings.remove(&(bid.studio_id, bid.slot));
            let refund = displaced.map(|held| held.refund).unwrap_or(0);
            let budget_after = budget_before + refund - bid.amount;
            self.budgets.insert(bid.studio_id, budget_after);
            self.won_slots.insert((bid.studio_id, bid.slot));

            outcomes.push((bid.bid_id, BidOutcome::Won));
            winner = Some(WinningBid {
                bid_id: bid.bid_id,
                studio_id: bid.studio_id,
                film_id: bid.film_id,
                slot: bid.slot,
                amount: bid.amount,
                displaced,
                budget_before,
                budget_after,
            });
        }

        FilmResolution {
            film_id,
            winner,
            outcomes,
        }
    }
}

impl Iterator for SettlementPass {
    type Item = FilmResolution;

    fn next(&mut self) -> Option<FilmResolution> {
        let film_id = self.next_film()?;
        let (film_bids, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.remaining)
            .into_iter()
            .partition(|bid| bid.film_id == film_id);
        self.remaining = rest;
        Some(self.resolve(film_id, film_bids))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn bid(id: DbId, studio: DbId, film: FilmId, slot: SlotPosition, amount: Amount, t: i64) -> BidCandidate {
        BidCandidate {
            bid_id: id,
            studio_id: studio,
            film_id: film,
            slot,
            amount,
            created_at: at(t),
        }
    }

    fn budgets(entries: &[(DbId, Amount)]) -> HashMap<DbId, Amount> {
        entries.iter().copied().collect()
    }

    fn settle(bids: Vec<BidCandidate>, b: &[(DbId, Amount)]) -> (Vec<FilmResolution>, SettlementPass) {
        let mut pass = SettlementPass::new(bids, budgets(b), HashMap::new());
        let resolutions: Vec<_> = pass.by_ref().collect();
        (resolutions, pass)
    }

    fn outcome_of(resolutions: &[FilmResolution], bid_id: DbId) -> BidOutcome {
        resolutions
            .iter()
            .flat_map(|r| r.outcomes.iter())
            .find(|(id, _)| *id == bid_id)
            .map(|(_, o)| *o)
            .expect("bid should be resolved")
    }

    // -- tie-breaks -----------------------------------------------------------

    #[test]
    fn equal_amounts_earlier_bid_wins() {
        let (res, _) = settle(
            vec![bid(2, 20, 500, 1, 40, 2), bid(1, 10, 500, 1, 40, 1)],
            &[(10, 100), (20, 100)],
        );
        assert_eq!(outcome_of(&res, 1), BidOutcome::Won);
        assert_eq!(outcome_of(&res, 2), BidOutcome::Lost);
    }

    #[test]
    fn higher_amount_wins_regardless_of_creation_order() {
        let (res, _) = settle(
            vec![bid(1, 10, 500, 1, 30, 1), bid(2, 20, 500, 1, 31, 9)],
            &[(10, 100), (20, 100)],
        );
        assert_eq!(outcome_of(&res, 2), BidOutcome::Won);
        assert_eq!(outcome_of(&res, 1), BidOutcome::Lost);
    }

    // -- end-to-end example ---------------------------------------------------

    #[test]
    fn two_studios_same_film_same_amount() {
        let (res, pass) = settle(
            vec![bid(1, 10, 900, 1, 40, 1), bid(2, 20, 900, 1, 40, 2)],
            &[(10, 100), (20, 100)],
        );
        assert_eq!(res.len(), 1);
        let winner = res[0].winner.as_ref().expect("film should have a winner");
        assert_eq!(winner.studio_id, 10);
        assert_eq!(winner.film_id, 900);
        assert_eq!(winner.slot, 1);
        assert_eq!(outcome_of(&res, 2), BidOutcome::Lost);
        assert_eq!(pass.budget(10), 60);
        assert_eq!(pass.budget(20), 100);
    }

    // -- slot contention ------------------------------------------------------

    #[test]
    fn studio_wins_at_most_one_film_per_slot() {
        let (res, _) = settle(
            vec![
                bid(1, 10, 500, 1, 50, 1),
                bid(2, 10, 600, 1, 40, 2),
                bid(3, 20, 600, 1, 30, 3),
            ],
            &[(10, 100), (20, 100)],
        );
        assert_eq!(outcome_of(&res, 1), BidOutcome::Won);
        assert_eq!(outcome_of(&res, 2), BidOutcome::Ignored);
        assert_eq!(outcome_of(&res, 3), BidOutcome::Won);

        let studio_10_wins_in_slot_1 = res
            .iter()
            .filter_map(|r| r.winner.as_ref())
            .filter(|w| w.studio_id == 10 && w.slot == 1)
            .count();
        assert_eq!(studio_10_wins_in_slot_1, 1);
    }

    #[test]
    fn same_studio_can_win_different_slots() {
        let (res, pass) = settle(
            vec![bid(1, 10, 500, 1, 30, 1), bid(2, 10, 600, 2, 20, 2)],
            &[(10, 100)],
        );
        assert_eq!(outcome_of(&res, 1), BidOutcome::Won);
        assert_eq!(outcome_of(&res, 2), BidOutcome::Won);
        assert_eq!(pass.budget(10), 50);
    }

    #[test]
    fn fully_contended_film_resolves_without_winner() {
        let (res, _) = settle(
            vec![bid(1, 10, 500, 1, 50, 1), bid(2, 10, 600, 1, 10, 2)],
            &[(10, 100)],
        );
        let film_600 = res.iter().find(|r| r.film_id == 600).unwrap();
        assert!(film_600.winner.is_none());
        assert_eq!(film_600.outcomes, vec![(2, BidOutcome::Ignored)]);
    }

    // -- processing order -----------------------------------------------------

    #[test]
    fn films_ordered_by_highest_remaining_bid() {
        // Studio 10's 55 on film 2 is blocked by its slot-1 win on film 1,
        // yet film 2 still goes before film 3: studio 20 wins it for 10 and
        // can no longer afford its 50 on film 3.
        let (res, pass) = settle(
            vec![
                bid(1, 10, 1, 1, 60, 1),
                bid(2, 10, 2, 1, 55, 2),
                bid(3, 20, 2, 2, 10, 3),
                bid(4, 20, 3, 3, 50, 4),
            ],
            &[(10, 100), (20, 55)],
        );
        let order: Vec<FilmId> = res.iter().map(|r| r.film_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(outcome_of(&res, 1), BidOutcome::Won);
        assert_eq!(outcome_of(&res, 2), BidOutcome::Ignored);
        assert_eq!(outcome_of(&res, 3), BidOutcome::Won);
        assert_eq!(outcome_of(&res, 4), BidOutcome::Invalid);
        assert_eq!(pass.budget(20), 45);
    }

    // -- budgets --------------------------------------------------------------

    #[test]
    fn insufficient_funds_invalidates_and_next_bid_wins() {
        let (res, pass) = settle(
            vec![bid(1, 10, 500, 1, 40, 1), bid(2, 20, 500, 1, 20, 2)],
            &[(10, 30), (20, 100)],
        );
        assert_eq!(outcome_of(&res, 1), BidOutcome::Invalid);
        assert_eq!(outcome_of(&res, 2), BidOutcome::Won);
        assert_eq!(pass.budget(10), 30);
        assert_eq!(pass.budget(20), 80);
    }

    #[test]
    fn budget_spent_earlier_in_pass_invalidates_later_bid() {
        let (res, pass) = settle(
            vec![
                bid(1, 10, 500, 1, 70, 1),
                bid(2, 10, 600, 2, 50, 2),
                bid(3, 20, 600, 2, 40, 3),
            ],
            &[(10, 100), (20, 100)],
        );
        assert_eq!(outcome_of(&res, 1), BidOutcome::Won);
        assert_eq!(outcome_of(&res, 2), BidOutcome::Invalid);
        assert_eq!(outcome_of(&res, 3), BidOutcome::Won);
        assert_eq!(pass.budget(10), 30);
        assert_eq!(pass.budget(20), 60);
    }

    #[test]
    fn unknown_studio_cannot_afford_anything() {
        let (res, _) = settle(vec![bid(1, 99, 500, 1, 1, 1)], &[]);
        assert_eq!(outcome_of(&res, 1), BidOutcome::Invalid);
        assert!(res[0].winner.is_none());
    }

    #[test]
    fn budget_conserved_and_never_negative() {
        let bids = vec![
            bid(1, 10, 1, 1, 45, 1),
            bid(2, 20, 1, 1, 45, 2),
            bid(3, 10, 2, 2, 45, 3),
            bid(4, 20, 2, 2, 30, 4),
            bid(5, 10, 3, 3, 20, 5),
            bid(6, 30, 3, 3, 20, 6),
            bid(7, 30, 4, 1, 0, 7),
        ];
        let before = [(10, 100), (20, 50), (30, 10)];
        let (res, pass) = settle(bids, &before);

        for (studio, start) in before {
            let spent: Amount = res
                .iter()
                .filter_map(|r| r.winner.as_ref())
                .filter(|w| w.studio_id == studio)
                .map(|w| w.amount)
                .sum();
            assert_eq!(pass.budget(studio), start - spent);
            assert!(pass.budget(studio) >= 0);
        }
    }

    #[test]
    fn displaced_film_refund_returns_to_budget() {
        let mut holdings = HashMap::new();
        holdings.insert(
            (10, 1),
            HeldFilm {
                studio_film_id: 77,
                film_id: 111,
                refund: 40,
            },
        );
        let mut pass = SettlementPass::new(
            vec![bid(1, 10, 500, 1, 20, 1)],
            budgets(&[(10, 50)]),
            holdings,
        );
        let res = pass.next().unwrap();
        let winner = res.winner.unwrap();
        assert_eq!(winner.displaced.map(|h| h.film_id), Some(111));
        assert_eq!(winner.budget_before, 50);
        assert_eq!(winner.budget_after, 70);
        assert_eq!(pass.budget(10), 70);
        assert!(pass.next().is_none());
    }

    #[test]
    fn affordability_checked_before_refund() {
        let mut holdings = HashMap::new();
        holdings.insert(
            (10, 1),
            HeldFilm {
                studio_film_id: 77,
                film_id: 111,
                refund: 40,
            },
        );
        let mut pass = SettlementPass::new(
            vec![bid(1, 10, 500, 1, 20, 1)],
            budgets(&[(10, 10)]),
            holdings,
        );
        let res = pass.next().unwrap();
        assert!(res.winner.is_none());
        assert_eq!(res.outcomes, vec![(1, BidOutcome::Invalid)]);
    }

    // -- failed writes --------------------------------------------------------

    #[test]
    fn reverted_win_frees_slot_and_budget() {
        let mut holdings = HashMap::new();
        holdings.insert(
            (10, 1),
            HeldFilm {
                studio_film_id: 77,
                film_id: 111,
                refund: 40,
            },
        );
        let mut pass = SettlementPass::new(
            vec![bid(1, 10, 500, 1, 30, 1), bid(2, 10, 600, 1, 20, 2)],
            budgets(&[(10, 50)]),
            holdings,
        );

        let first = pass.next().unwrap();
        let win = first.winner.expect("film 500 should have a winner");
        assert_eq!(pass.budget(10), 60);
        pass.revert(&win);
        assert_eq!(pass.budget(10), 50);

        // Film 600 for the same slot is no longer contended and displaces
        // the original occupant again.
        let second = pass.next().unwrap();
        assert_eq!(second.outcomes, vec![(2, BidOutcome::Won)]);
        let winner = second.winner.unwrap();
        assert_eq!(winner.displaced.map(|h| h.film_id), Some(111));
        assert_eq!(winner.budget_after, 70);
    }

    // -- determinism ----------------------------------------------------------

    #[test]
    fn rerun_on_same_snapshot_is_identical() {
        let bids = vec![
            bid(5, 30, 3, 1, 25, 5),
            bid(1, 10, 1, 1, 40, 1),
            bid(4, 20, 2, 1, 25, 4),
            bid(2, 20, 1, 1, 40, 2),
            bid(3, 10, 2, 1, 35, 3),
        ];
        let b = [(10, 60), (20, 60), (30, 60)];
        let (first, _) = settle(bids.clone(), &b);
        let mut shuffled = bids;
        shuffled.reverse();
        let (second, _) = settle(shuffled, &b);
        assert_eq!(first, second);
    }

    #[test]
    fn every_film_is_resolved_once() {
        let (res, pass) = settle(
            vec![
                bid(1, 10, 1, 1, 5, 1),
                bid(2, 20, 2, 1, 5, 2),
                bid(3, 30, 3, 1, 5, 3),
                bid(4, 10, 3, 2, 1, 4),
            ],
            &[(10, 0), (20, 100), (30, 100)],
        );
        let mut films: Vec<FilmId> = res.iter().map(|r| r.film_id).collect();
        films.sort_unstable();
        assert_eq!(films, vec![1, 2, 3]);
        assert_eq!(pass.remaining_bids(), 0);
    }
}
