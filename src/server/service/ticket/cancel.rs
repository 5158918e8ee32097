use chrono::Utc;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::server::{
    data::{ticket::TicketRepository, user_account::UserAccountRepository},
    error::{ticket::TicketError, AppError},
    model::{
        log::LogEvent,
        ticket::{Ticket, TicketAction, TicketStatus},
    },
    service::confirmation::GateAction,
};

use super::TicketService;

impl<'a> TicketService<'a> {
    /// Opens the confirmation gate of the cancel button.
    pub async fn request_cancellation(&self, name: &str, actor_id: u64) -> Result<Uuid, AppError> {
        let ticket = self.require(name).await?;
        ticket.status.guard(TicketAction::Cancel, name)?;
        self.authorize_requester_or_admin(&ticket, actor_id).await?;

        Ok(self
            .state
            .gates
            .open(
                &ticket.name,
                GateAction::Cancel,
                ticket.requester_id,
                self.state.policy.confirmation_timeout,
            )
            .await)
    }

    /// Cancels an open ticket. Bindings are cleared and no points move.
    ///
    /// # Returns
    /// - `Ok(Ticket)` - The ticket as it was before cancellation
    /// - `Err(AppError::TicketErr(AlreadyClosed | AlreadyLocked))` - Lost the race to another
    ///   terminal transition
    /// - `Err(AppError::TicketErr(Unauthorized))` - Actor is neither requester nor admin
    pub async fn cancel(&self, name: &str, actor_id: u64) -> Result<Ticket, AppError> {
        let guard = self.state.locks.acquire(name).await;

        let ticket = self.require(name).await?;
        ticket.status.guard(TicketAction::Cancel, name)?;
        self.authorize_requester_or_admin(&ticket, actor_id).await?;

        let txn = self.state.db.begin().await?;
        let closed = TicketRepository::new(&txn)
            .close_open(
                name,
                TicketStatus::Cancelled,
                Some(actor_id),
                false,
                Utc::now(),
            )
            .await?;
        if !closed {
            txn.rollback().await?;
            let current = self.require(name).await?;
            let err = current
                .status
                .guard(TicketAction::Cancel, name)
                .err()
                .unwrap_or_else(|| TicketError::AlreadyClosed(name.to_string()));
            return Err(err.into());
        }

        let accounts = UserAccountRepository::new(&txn);
        for &user_id in ticket.claimers.iter().chain(std::iter::once(&ticket.requester_id)) {
            accounts
                .clear_active_ticket(user_id, Some(&ticket.name))
                .await?;
        }
        txn.commit().await?;

        drop(guard);
        self.state.locks.release(name).await;

        tracing::info!("{} cancelled by {}", ticket.name, actor_id);

        if let Err(e) = self
            .state
            .notifier
            .log_event(LogEvent::TicketCancelled {
                ticket_name: ticket.name.clone(),
                cancelled_by: actor_id,
                claimers: ticket.claimers.clone(),
            })
            .await
        {
            tracing::error!("Failed to log cancellation of {}: {}", ticket.name, e);
        }

        self.finish_terminal(&ticket).await;

        Ok(ticket)
    }
}
