//! Typed league-session configuration.
//!
//! Stored as a JSONB blob on `league_sessions.settings`. The JSON shape uses
//! camelCase keys (`teamStructure`, `timePerRound`, ...) so existing blobs
//! round-trip unchanged. Validation happens once, at write time.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scoring::SlotType;
use crate::types::{Amount, DbId, SlotPosition, Timestamp};

/// Budget each studio starts a session with when settings omit it.
pub const DEFAULT_STARTING_BUDGET: Amount = 100;

/// One roster slot: its 1-based position and how it is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDefinition {
    pub slot_type: SlotType,
    pub position: SlotPosition,
}

/// Pick ordering across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftType {
    #[default]
    Snake,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSettings {
    /// Whether the session fills rosters through a live draft.
    pub conduct: bool,
    pub date: Option<Timestamp>,
    /// Owner (user) ids in first-round pick order.
    #[serde(default)]
    pub order: Vec<DbId>,
    pub num_rounds: u32,
    /// Seconds each studio has to make its pick.
    pub time_per_round: u32,
    #[serde(rename = "type", default)]
    pub draft_type: DraftType,
}

/// How studios acquire films in a session. Drives the drop-refund rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode {
    Draft,
    BidWar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub team_structure: Vec<SlotDefinition>,
    pub draft: DraftSettings,
    #[serde(default = "default_starting_budget")]
    pub starting_budget: Amount,
}

fn default_starting_budget() -> Amount {
    DEFAULT_STARTING_BUDGET
}

impl SessionSettings {
    pub fn acquisition_mode(&self) -> AcquisitionMode {
        if self.draft.conduct {
            AcquisitionMode::Draft
        } else {
            AcquisitionMode::BidWar
        }
    }

    pub fn slot_count(&self) -> usize {
        self.team_structure.len()
    }

    /// Look up the slot definition at `position`.
    pub fn slot(&self, position: SlotPosition) -> Option<&SlotDefinition> {
        self.team_structure.iter().find(|s| s.position == position)
    }

    /// Like [`slot`](Self::slot) but reports an unknown position as a
    /// validation error.
    pub fn require_slot(&self, position: SlotPosition) -> Result<&SlotDefinition, CoreError> {
        self.slot(position).ok_or_else(|| {
            CoreError::Validation(format!(
                "Slot {position} is not part of this session's team structure"
            ))
        })
    }

    /// Slot positions in ascending order.
    pub fn positions(&self) -> Vec<SlotPosition> {
        let mut positions: Vec<_> = self.team_structure.iter().map(|s| s.position).collect();
        positions.sort_unstable();
        positions
    }

    /// Validate the settings as a whole.
    ///
    /// Rules:
    /// - `teamStructure` is non-empty and its positions are exactly `1..=n`.
    /// - `startingBudget` is positive.
    /// - When a draft is conducted: the order is non-empty and duplicate
    ///   free, `numRounds` equals the slot count, and `timePerRound > 0`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.team_structure.is_empty() {
            return Err(CoreError::Validation(
                "Team structure must contain at least one slot".to_string(),
            ));
        }

        let expected: Vec<SlotPosition> = (1..=self.team_structure.len() as SlotPosition).collect();
        if self.positions() != expected {
            return Err(CoreError::Validation(format!(
                "Slot positions must be exactly 1..={} with no duplicates",
                self.team_structure.len()
            )));
        }

        if self.starting_budget <= 0 {
            return Err(CoreError::Validation(
                "Starting budget must be positive".to_string(),
            ));
        }

        if self.draft.conduct {
            if self.draft.order.is_empty() {
                return Err(CoreError::Validation(
                    "Draft order must not be empty when a draft is conducted".to_string(),
                ));
            }
            let mut seen = HashSet::with_capacity(self.draft.order.len());
            for owner in &self.draft.order {
                if !seen.insert(owner) {
                    return Err(CoreError::Validation(format!(
                        "Owner {owner} appears more than once in the draft order"
                    )));
                }
            }
            if self.draft.num_rounds as usize != self.team_structure.len() {
                return Err(CoreError::Validation(format!(
                    "Draft rounds ({}) must equal the number of slots ({})",
                    self.draft.num_rounds,
                    self.team_structure.len()
                )));
            }
            if self.draft.time_per_round == 0 {
                return Err(CoreError::Validation(
                    "Time per round must be greater than zero".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Validate a session's inclusive eligibility window.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::Validation(format!(
            "Session start date {start} is after end date {end}"
        )));
    }
    Ok(())
}
