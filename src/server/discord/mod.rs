//! Chat platform and profile service adapters.
//!
//! Implementations of the `port` traits over the Discord REST API (serenity) and the game's
//! character pages (reqwest).

pub mod directory;
pub mod notifier;
pub mod panel;
pub mod profile;
