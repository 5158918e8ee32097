//! Discord bot integration for the help desk.
//!
//! The bot registers the guild slash commands, turns button clicks on ticket panels and
//! confirmation prompts into service calls, and tags newcomers with the stranger role.
//! Replies to the acting user are ephemeral; ticket state changes are pushed to the ticket
//! channels through the notifier instead.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - Guild availability and interaction routing
//! - `GUILD_MEMBERS` - Member joins (privileged intent)
//!
//! Note: `GUILD_MEMBERS` is a privileged intent and must be explicitly enabled
//! in the Discord Developer Portal for the bot application.

pub mod action;
pub mod command;
pub mod handler;
pub mod start;
