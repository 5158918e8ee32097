//! Ticket lifecycle: creation, claims, settlement and cancellation.
//!
//! Every mutation of a ticket's claimers or status runs under the per-ticket lock from
//! `TicketLocks`. Terminal transitions additionally go through a compare-and-set on the stored
//! status, which is what guarantees a ticket is settled at most once even across processes.
//! Chat-platform side effects run after the database work is committed; their failures are
//! logged and never undo ledger changes.

pub mod cancel;
pub mod claim;
pub mod create;
pub mod force;
pub mod lock;
pub mod maintenance;
pub mod reward;
pub mod settle;

use crate::server::{
    data::ticket::TicketRepository,
    error::{ticket::TicketError, AppError},
    model::ticket::Ticket,
    service::leaderboard::LeaderboardService,
    state::AppState,
};

pub struct TicketService<'a> {
    state: &'a AppState,
}

impl<'a> TicketService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn get(&self, name: &str) -> Result<Option<Ticket>, AppError> {
        TicketRepository::new(&self.state.db).find_by_name(name).await
    }

    async fn require(&self, name: &str) -> Result<Ticket, AppError> {
        self.get(name)
            .await?
            .ok_or_else(|| TicketError::NotFound(name.to_string()).into())
    }

    async fn is_admin(&self, user_id: u64) -> Result<bool, AppError> {
        Ok(self
            .state
            .directory
            .has_role(user_id, self.state.roles.admin)
            .await?)
    }

    /// Requester, admins and senior helpers may complete a ticket.
    async fn authorize_completion(&self, ticket: &Ticket, actor_id: u64) -> Result<(), AppError> {
        if ticket.is_requester(actor_id) || self.is_admin(actor_id).await? {
            return Ok(());
        }

        let senior = self
            .state
            .directory
            .has_role(actor_id, self.state.roles.senior_helper)
            .await?;
        if senior {
            return Ok(());
        }

        Err(TicketError::Unauthorized.into())
    }

    /// Requester and admins may cancel a ticket or ping helpers.
    async fn authorize_requester_or_admin(
        &self,
        ticket: &Ticket,
        actor_id: u64,
    ) -> Result<(), AppError> {
        if ticket.is_requester(actor_id) || self.is_admin(actor_id).await? {
            return Ok(());
        }

        Err(TicketError::Unauthorized.into())
    }

    /// Re-renders the ticket panel. Failures are logged.
    async fn refresh_panel(&self, ticket: &Ticket) {
        let Some(handle) = ticket.panel() else {
            return;
        };

        if let Err(e) = self.state.notifier.update_ticket_panel(handle, ticket).await {
            tracing::warn!("Failed to update panel of {}: {}", ticket.name, e);
        }
    }

    /// Posts a message in the ticket channel. Failures are logged.
    async fn announce(&self, ticket: &Ticket, content: &str) {
        let Some(channel_id) = ticket.channel_id else {
            return;
        };

        if let Err(e) = self
            .state
            .notifier
            .send_channel_message(channel_id, content)
            .await
        {
            tracing::warn!("Failed to post in channel of {}: {}", ticket.name, e);
        }
    }

    /// Leaderboard refresh and channel removal after a terminal transition.
    async fn finish_terminal(&self, ticket: &Ticket) {
        if let Err(e) = LeaderboardService::new(self.state).refresh().await {
            tracing::error!(
                "Failed to refresh leaderboard after {}: {}",
                ticket.name,
                e
            );
        }

        if let Some(channel_id) = ticket.channel_id {
            if let Err(e) = self.state.notifier.delete_channel(channel_id).await {
                tracing::error!("Failed to delete channel of {}: {}", ticket.name, e);
            }
        }
    }
}
