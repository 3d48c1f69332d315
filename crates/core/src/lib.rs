//! Domain logic for the fantasy-film league.
//!
//! Everything in this crate is pure: no database, no network, no clock
//! reads. The `db` and `api` crates feed it snapshots and apply the plans
//! it returns.

pub mod activity;
pub mod bidding;
pub mod draft;
pub mod error;
pub mod film;
pub mod scoring;
pub mod session_settings;
pub mod settlement;
pub mod studio;
pub mod topics;
pub mod types;
