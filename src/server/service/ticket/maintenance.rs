use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;

use crate::server::{
    data::{ticket::TicketRepository, user_account::UserAccountRepository},
    error::{ticket::TicketError, AppError},
    model::{
        log::LogEvent,
        ticket::{Ticket, TicketAction, TicketStatus},
    },
};

use super::TicketService;

impl<'a> TicketService<'a> {
    /// Mentions the helper role in the ticket channel, at most once per cooldown.
    ///
    /// # Returns
    /// - `Ok(())` - Helpers pinged and ping time recorded
    /// - `Err(AppError::TicketErr(Cooldown))` - Last ping is too recent
    /// - `Err(AppError::TicketErr(Unauthorized))` - Actor is neither requester nor admin
    pub async fn ping_helpers(&self, name: &str, actor_id: u64) -> Result<(), AppError> {
        let _guard = self.state.locks.acquire(name).await;

        let ticket = self.require(name).await?;
        ticket.status.guard(TicketAction::PingHelpers, name)?;
        self.authorize_requester_or_admin(&ticket, actor_id).await?;

        let now = Utc::now();
        if let Some(last) = ticket.last_helper_ping {
            let ready_at = last + self.state.policy.helper_ping_cooldown;
            if now < ready_at {
                return Err(TicketError::Cooldown {
                    remaining_secs: (ready_at - now).num_seconds().max(1),
                }
                .into());
            }
        }

        let channel_id = ticket.channel_id.ok_or_else(|| {
            TicketError::InvalidInput(format!("Ticket {} has no channel", ticket.name))
        })?;

        self.state
            .notifier
            .send_channel_message(
                channel_id,
                &format!(
                    "<@&{}> 🔔 {} still needs help ({}/{})",
                    self.state.roles.helper,
                    ticket.name,
                    ticket.claimers.len(),
                    ticket.max_claimers
                ),
            )
            .await?;

        TicketRepository::new(&self.state.db)
            .record_helper_ping(name, now)
            .await?;

        tracing::info!("{} pinged helpers for {}", actor_id, ticket.name);

        Ok(())
    }

    /// Re-renders the panels of open tickets after a restart.
    ///
    /// Panels are rebuilt from the stored ticket, claimers included. Tickets whose channel is
    /// gone are skipped; the expiry sweep closes them.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of panels restored
    pub async fn restore_open_tickets(&self) -> Result<usize, AppError> {
        let repo = TicketRepository::new(&self.state.db);
        let notifier = &self.state.notifier;
        let mut restored = 0;

        for ticket in repo.list_by_status(TicketStatus::Open).await? {
            let Some(channel_id) = ticket.channel_id else {
                continue;
            };

            match notifier.channel_exists(channel_id).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!("Channel of {} is gone, not restoring", ticket.name);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Failed to check channel of {}: {}", ticket.name, e);
                    continue;
                }
            }

            if let Some(handle) = ticket.panel() {
                match notifier.update_ticket_panel(handle, &ticket).await {
                    Ok(()) => {
                        restored += 1;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Panel of {} could not be edited, posting a new one: {}",
                            ticket.name,
                            e
                        );
                    }
                }
            }

            match notifier.render_ticket_panel(&ticket).await {
                Ok(handle) => {
                    repo.set_panel(&ticket.name, channel_id, Some(handle.message_id))
                        .await?;
                    restored += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to restore panel of {}: {}", ticket.name, e);
                }
            }
        }

        tracing::info!("Restored {} ticket panels", restored);

        Ok(restored)
    }

    /// Tickets left in `completing` since before `older_than`, for manual reconciliation.
    pub async fn list_stuck(&self, older_than: DateTime<Utc>) -> Result<Vec<Ticket>, AppError> {
        TicketRepository::new(&self.state.db)
            .list_stuck(older_than)
            .await
    }

    /// Closes an expired or orphaned ticket without touching the ledger.
    ///
    /// # Returns
    /// - `Ok(true)` - This call closed the ticket
    /// - `Ok(false)` - The ticket was no longer open
    pub async fn auto_close(&self, name: &str, orphaned: bool) -> Result<bool, AppError> {
        let guard = self.state.locks.acquire(name).await;

        let Some(ticket) = self.get(name).await? else {
            return Ok(false);
        };
        if ticket.status.guard(TicketAction::AutoClose, name).is_err() {
            return Ok(false);
        }

        let txn = self.state.db.begin().await?;
        let closed = TicketRepository::new(&txn)
            .close_open(name, TicketStatus::Closed, None, true, Utc::now())
            .await?;
        if !closed {
            txn.rollback().await?;
            return Ok(false);
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

        tracing::info!(
            "{} auto-closed{}",
            ticket.name,
            if orphaned { " (channel missing)" } else { "" }
        );

        if let Err(e) = self
            .state
            .notifier
            .log_event(LogEvent::TicketAutoClosed {
                ticket_name: ticket.name.clone(),
                requester_id: ticket.requester_id,
                orphaned,
            })
            .await
        {
            tracing::error!("Failed to log auto-close of {}: {}", ticket.name, e);
        }

        if !orphaned {
            if let Some(channel_id) = ticket.channel_id {
                if let Err(e) = self.state.notifier.delete_channel(channel_id).await {
                    tracing::error!("Failed to delete channel of {}: {}", ticket.name, e);
                }
            }
        }

        Ok(true)
    }
}
