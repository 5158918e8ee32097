//! SeaORM entity models for the help-ticket engine.

pub mod prelude;

pub mod boss_rule;
pub mod points_archive;
pub mod points_archive_entry;
pub mod sequence;
pub mod ticket;
pub mod ticket_claimer;
pub mod ticket_type_boss;
pub mod user_account;
