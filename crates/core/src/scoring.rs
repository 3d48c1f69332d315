//! Per-film scoring keyed by slot type.
//!
//! Scores are always rounded to one decimal place. A film missing the field
//! its slot needs scores 0 rather than failing, because studio totals sum
//! every slot.

use serde::{Deserialize, Serialize};

use crate::film::FilmDetails;

/// How a roster slot converts film metadata into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    TotalBoxOffice,
    OpeningWeekendBoxOffice,
    Rating,
    ReverseRating,
}

impl SlotType {
    /// Human-readable label used in activity messages.
    pub fn label(self) -> &'static str {
        match self {
            SlotType::TotalBoxOffice => "Total Box Office",
            SlotType::OpeningWeekendBoxOffice => "Opening Weekend Box Office",
            SlotType::Rating => "Rating",
            SlotType::ReverseRating => "Reverse Rating",
        }
    }
}

/// Round to one decimal place, halves rounding up.
pub fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Round a rating already scaled by 100 to tenths, halves up. Rounds once,
/// on the scaled value.
fn tenths(scaled: f64) -> f64 {
    (scaled + 0.5).floor() / 10.0
}

/// Score a film for the given slot type.
pub fn score(slot_type: SlotType, film: &FilmDetails) -> f64 {
    match slot_type {
        SlotType::TotalBoxOffice => film
            .revenue
            .map(|revenue| round1(revenue as f64 / 1_000_000.0))
            .unwrap_or(0.0),
        SlotType::OpeningWeekendBoxOffice => film
            .opening_weekend_revenue
            .or(film.revenue)
            .map(|revenue| round1(revenue as f64 / 100_000.0))
            .unwrap_or(0.0),
        SlotType::Rating => film
            .average_rating
            .map(|rating| tenths(rating * 100.0))
            .unwrap_or(0.0),
        SlotType::ReverseRating => film
            .average_rating
            .map(|rating| tenths((10.0 - rating) * 100.0))
            .unwrap_or(0.0),
    }
}

/// Sum per-slot scores into a studio total.
///
/// Each slot score is rounded before summing and the total is rounded again
/// so floating-point drift never leaks into standings.
pub fn studio_total<I>(slot_scores: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    round1(slot_scores.into_iter().map(round1).sum())
}
