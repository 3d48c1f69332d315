/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Whole currency units of a studio budget or bid.
pub type Amount = i32;

/// 1-based roster slot position within a studio.
pub type SlotPosition = i32;

/// External film-database identifier (TMDB movie id).
pub type FilmId = i64;
