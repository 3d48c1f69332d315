//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and the input DTOs its repository accepts.

pub mod activity;
pub mod film_bid;
pub mod league;
pub mod league_session;
pub mod status;
pub mod studio;
pub mod studio_film;
