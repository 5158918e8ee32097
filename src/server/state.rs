//! Application state shared by the bot handlers, the scheduler and the services.
//!
//! The state is built once at startup and cloned into every handler. All fields are cheap to
//! clone: the database connection is a pool, collaborators are behind `Arc`, and the
//! in-memory registries share their storage through `Arc` internally.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::server::{
    config::{RoleConfig, TicketPolicy},
    port::{GuildDirectory, Notifier, ProfileLookup},
    service::{
        confirmation::ConfirmationGates, rules::PointRuleCache, ticket::lock::TicketLocks,
        verification::PendingVerifications,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,

    /// Ticket channels, panels, audit log and leaderboard.
    pub notifier: Arc<dyn Notifier>,

    /// Role checks and role edits in the home Discord guild.
    pub directory: Arc<dyn GuildDirectory>,

    /// External game profile service used by verification.
    pub lookup: Arc<dyn ProfileLookup>,

    pub roles: Arc<RoleConfig>,
    pub policy: Arc<TicketPolicy>,

    /// In-game guild whose members get the member role.
    pub home_guild_name: Arc<str>,

    pub locks: TicketLocks,
    pub gates: ConfirmationGates,
    pub rules: PointRuleCache,
    pub pending_verifications: PendingVerifications,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn Notifier>,
        directory: Arc<dyn GuildDirectory>,
        lookup: Arc<dyn ProfileLookup>,
        roles: RoleConfig,
        policy: TicketPolicy,
        home_guild_name: &str,
    ) -> Self {
        let gates = ConfirmationGates::new(notifier.clone());

        Self {
            db,
            notifier,
            directory,
            lookup,
            roles: Arc::new(roles),
            policy: Arc::new(policy),
            home_guild_name: Arc::from(home_guild_name),
            locks: TicketLocks::new(),
            gates,
            rules: PointRuleCache::default(),
            pending_verifications: PendingVerifications::default(),
        }
    }
}
