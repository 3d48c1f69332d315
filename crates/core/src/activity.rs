//! Human-readable messages for the session activity feed.

use crate::scoring::SlotType;
use crate::types::{Amount, SlotPosition};

pub fn bid_won(
    studio: &str,
    film: &str,
    slot: SlotPosition,
    slot_type: Option<SlotType>,
    amount: Amount,
    displaced: Option<&str>,
) -> String {
    let mut message = format!(
        "{studio} won {film} for ${amount} in slot {slot}{}",
        slot_suffix(slot_type)
    );
    if let Some(displaced) = displaced {
        message.push_str(&format!(", replacing {displaced}"));
    }
    message.push('.');
    message
}

pub fn draft_pick(
    studio: &str,
    film: &str,
    pick: u32,
    slot: SlotPosition,
    slot_type: Option<SlotType>,
    automatic: bool,
) -> String {
    let how = if automatic { " (auto-pick)" } else { "" };
    format!(
        "{studio} drafted {film} with pick #{pick} into slot {slot}{}{how}.",
        slot_suffix(slot_type)
    )
}

pub fn dropped(studio: &str, film: &str, slot: SlotPosition, refund: Amount) -> String {
    if refund > 0 {
        format!("{studio} dropped {film} from slot {slot} and was refunded ${refund}.")
    } else {
        format!("{studio} dropped {film} from slot {slot}.")
    }
}

pub fn moved(studio: &str, film: &str, from: SlotPosition, to: SlotPosition) -> String {
    format!("{studio} moved {film} from slot {from} to slot {to}.")
}

pub fn draft_started(first_studio: &str) -> String {
    format!("The draft has started. {first_studio} is on the clock.")
}

pub fn draft_complete() -> String {
    "The draft is complete.".to_string()
}

pub fn settlement_summary(films: usize, won: usize) -> String {
    format!("Bids settled: {won} of {films} contested films awarded.")
}

fn slot_suffix(slot_type: Option<SlotType>) -> String {
    slot_type
        .map(|t| format!(" ({})", t.label()))
        .unwrap_or_default()
}
