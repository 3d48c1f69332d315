//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-row changes that must land
//! together open their own transaction.

pub mod activity_repo;
pub mod film_bid_repo;
pub mod league_repo;
pub mod league_session_repo;
pub mod studio_film_repo;
pub mod studio_repo;

pub use activity_repo::ActivityRepo;
pub use film_bid_repo::FilmBidRepo;
pub use league_repo::LeagueRepo;
pub use league_session_repo::LeagueSessionRepo;
pub use studio_film_repo::StudioFilmRepo;
pub use studio_repo::StudioRepo;
