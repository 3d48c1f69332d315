use async_trait::async_trait;
use bmb_core::film::FilmDetails;
use bmb_core::types::FilmId;
use chrono::NaiveDate;

use crate::error::FilmDbError;

/// Read-only access to film metadata, keyed by external film id.
///
/// Implementations may be eventually consistent; callers treat failures as
/// "data unavailable" and degrade rather than abort.
#[async_trait]
pub trait FilmMetadataSource: Send + Sync {
    /// Full metadata for one film.
    async fn film_details(&self, film_id: FilmId) -> Result<FilmDetails, FilmDbError>;

    /// Films releasing within the inclusive date range, most popular first.
    ///
    /// `page` is 1-based.
    async fn popular_films(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
    ) -> Result<Vec<FilmDetails>, FilmDbError>;
}
