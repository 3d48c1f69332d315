//! Film metadata as consumed by scoring, bidding and the draft.
//!
//! Populated by the film-metadata provider; every numeric field is optional
//! because the upstream database is eventually consistent and often sparse
//! for unreleased titles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::FilmId;

/// Metadata for a single film.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmDetails {
    pub id: FilmId,
    pub title: String,
    /// Worldwide gross in whole dollars.
    pub revenue: Option<i64>,
    /// Opening-weekend gross in whole dollars, when the provider reports it.
    pub opening_weekend_revenue: Option<i64>,
    /// Average audience rating on a 0-10 scale.
    pub average_rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    /// Provider popularity index; higher is more popular.
    pub popularity: Option<f64>,
}

impl FilmDetails {
    /// A placeholder record for a film whose metadata could not be fetched.
    ///
    /// Scores as zero in every slot type.
    pub fn unavailable(id: FilmId) -> Self {
        Self {
            id,
            title: format!("Film #{id}"),
            revenue: None,
            opening_weekend_revenue: None,
            average_rating: None,
            release_date: None,
            popularity: None,
        }
    }

    /// Whether the film releases inside the inclusive `[start, end]` range.
    ///
    /// Films with no known release date are treated as eligible.
    pub fn releases_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        match self.release_date {
            Some(date) => date >= start && date <= end,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(release: Option<NaiveDate>) -> FilmDetails {
        FilmDetails {
            release_date: release,
            ..FilmDetails::unavailable(1)
        }
    }

    #[test]
    fn release_window_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        assert!(film(Some(start)).releases_within(start, end));
        assert!(film(Some(end)).releases_within(start, end));
        assert!(!film(NaiveDate::from_ymd_opt(2024, 7, 1)).releases_within(start, end));
    }

    #[test]
    fn unknown_release_date_is_eligible() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert!(film(None).releases_within(start, end));
    }
}
