//! Help desk backend: ticket lifecycle, points ledger and member verification.
//!
//! # Architecture
//!
//! - **Bot** (`bot/`) - Slash commands, button dispatch and gateway event handlers
//! - **Service Layer** (`service/`) - Ticket lifecycle, settlement, expiry, ledger and
//!   verification logic
//! - **Data Layer** (`data/`) - Database operations and entity-to-domain model conversion
//! - **Model Layer** (`model/`) - Domain models and operation-specific parameter types
//! - **Port** (`port`) - Traits for the chat platform and the external profile service
//! - **Discord** (`discord/`) - serenity and reqwest implementations of the ports
//! - **Error Layer** (`error/`) - Application error types and user-facing messages
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based application configuration
//! - **State** (`state`) - Shared application state (DB, adapters, in-memory registries)
//! - **Startup** (`startup`) - Database, HTTP clients and adapter wiring
//! - **Scheduler** (`scheduler/`) - Cron job sweeping idle and orphaned tickets

pub mod bot;
pub mod config;
pub mod data;
pub mod discord;
pub mod error;
pub mod model;
pub mod port;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
