//! Film metadata collaborator.
//!
//! - [`FilmMetadataSource`]: the read-only provider interface the engines
//!   depend on.
//! - [`TmdbClient`]: implementation backed by The Movie Database REST API.
//! - [`CachedFilmSource`]: TTL cache in front of any source.

pub mod cache;
pub mod error;
pub mod source;
pub mod tmdb;

pub use cache::CachedFilmSource;
pub use error::FilmDbError;
pub use source::FilmMetadataSource;
pub use tmdb::TmdbClient;
