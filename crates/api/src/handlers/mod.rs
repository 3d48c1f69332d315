pub mod bid;
pub mod draft;
pub mod league;
pub mod session;
pub mod studio;
