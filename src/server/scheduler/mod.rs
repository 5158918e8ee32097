//! Cron jobs of the help desk.

pub mod expiry;
