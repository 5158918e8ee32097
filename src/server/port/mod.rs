//! Collaborator interfaces the ticket engine depends on.
//!
//! Services only talk to the chat platform and the external profile service through these
//! traits. The serenity and reqwest implementations live in `server::discord`; tests use
//! in-memory fakes.

use serenity::async_trait;
use uuid::Uuid;

use crate::server::{
    error::{lookup::LookupError, platform::PlatformError},
    model::{
        account::LeaderboardEntry,
        log::LogEvent,
        ticket::{ChannelSpec, MessageHandle, Ticket},
        verification::ExternalProfile,
    },
};

/// Pushes ticket surfaces and audit events to the chat platform.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Creates the private channel of a new ticket and returns its id.
    async fn create_ticket_channel(&self, spec: &ChannelSpec) -> Result<u64, PlatformError>;

    /// Posts the interactive panel of a ticket in its channel.
    async fn render_ticket_panel(&self, ticket: &Ticket) -> Result<MessageHandle, PlatformError>;

    /// Edits an existing panel to reflect the current ticket state.
    async fn update_ticket_panel(
        &self,
        handle: MessageHandle,
        ticket: &Ticket,
    ) -> Result<(), PlatformError>;

    async fn send_channel_message(&self, channel_id: u64, content: &str)
        -> Result<(), PlatformError>;

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError>;

    async fn channel_exists(&self, channel_id: u64) -> Result<bool, PlatformError>;

    async fn log_event(&self, event: LogEvent) -> Result<(), PlatformError>;

    async fn update_leaderboard(&self, entries: &[LeaderboardEntry]) -> Result<(), PlatformError>;

    /// Posts the confirm / decline prompt of a gate.
    async fn post_gate_prompt(
        &self,
        channel_id: u64,
        gate_id: Uuid,
        content: &str,
    ) -> Result<MessageHandle, PlatformError>;

    /// Greys out the buttons of a gate prompt once the gate can no longer be answered.
    async fn disable_gate_prompt(
        &self,
        handle: MessageHandle,
        gate_id: Uuid,
    ) -> Result<(), PlatformError>;
}

/// Role and membership lookups used for permission checks and role sync.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    async fn has_role(&self, user_id: u64, role_id: u64) -> Result<bool, PlatformError>;

    async fn role_members(&self, role_id: u64) -> Result<Vec<u64>, PlatformError>;

    async fn add_role(&self, user_id: u64, role_id: u64) -> Result<(), PlatformError>;

    async fn remove_role(&self, user_id: u64, role_id: u64) -> Result<(), PlatformError>;
}

/// External game profile service.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Looks a character up by name.
    ///
    /// # Returns
    /// - `Ok(Some(ExternalProfile))` - Character exists
    /// - `Ok(None)` - No such character
    /// - `Err(LookupError::RateLimited)` - Service asked us to slow down
    /// - `Err(LookupError::Failed)` - Any other failure
    async fn fetch_profile(&self, username: &str) -> Result<Option<ExternalProfile>, LookupError>;
}
