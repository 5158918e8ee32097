//! Server-side domain models and parameter types.
//!
//! Domain models are converted from entity models at the repository boundary and carry
//! parsed ids and enums so the service layer never handles raw column values.

pub mod account;
pub mod boss_rule;
pub mod log;
pub mod ticket;
pub mod verification;
