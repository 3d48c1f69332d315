//! Bid placement rules.
//!
//! Placement only checks what is knowable when the bid is made. Budgets can
//! still change before settlement, which re-checks affordability.

use crate::error::CoreError;
use crate::session_settings::SessionSettings;
use crate::types::{Amount, SlotPosition};

/// Input to [`validate_bid`].
pub struct BidPlacement<'a> {
    pub settings: &'a SessionSettings,
    pub budget: Amount,
    pub amount: Amount,
    pub slot: SlotPosition,
    /// The studio already has this film on its roster.
    pub already_holds_film: bool,
    /// The film's release falls outside the session window.
    pub outside_session_window: bool,
}

pub fn validate_bid(bid: &BidPlacement<'_>) -> Result<(), CoreError> {
    if bid.amount < 0 {
        return Err(CoreError::Validation(
            "Bid amount must not be negative".to_string(),
        ));
    }
    bid.settings.require_slot(bid.slot)?;
    if bid.outside_session_window {
        return Err(CoreError::Validation(
            "Film does not release within this session".to_string(),
        ));
    }
    if bid.already_holds_film {
        return Err(CoreError::Conflict(
            "Studio already has this film".to_string(),
        ));
    }
    if bid.amount > bid.budget {
        return Err(CoreError::InsufficientFunds {
            available: bid.budget,
            required: bid.amount,
        });
    }
    Ok(())
}
