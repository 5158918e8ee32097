use chrono::Utc;
use sea_orm::TransactionTrait;

use crate::server::{
    data::{ticket::TicketRepository, user_account::UserAccountRepository},
    error::{ticket::TicketError, AppError},
    model::ticket::{ClaimResult, Ticket, TicketAction},
};

use super::TicketService;

impl<'a> TicketService<'a> {
    /// Claims a helper slot, or releases it when the user already holds one.
    ///
    /// Checks run in a fixed order: capacity, the user's other active ticket, self claim and
    /// finally the helper role. The binding and the claimer row are written in one transaction
    /// so a user can never end up bound without holding the slot.
    ///
    /// # Returns
    /// - `Ok(ClaimResult::Claimed)` - Slot taken
    /// - `Ok(ClaimResult::Unclaimed)` - User was a claimer and released the slot
    /// - `Err(AppError::TicketErr(_))` - One of the checks above failed, nothing was written
    pub async fn claim(&self, name: &str, user_id: u64) -> Result<ClaimResult, AppError> {
        let _guard = self.state.locks.acquire(name).await;

        let mut ticket = self.require(name).await?;
        ticket.status.guard(TicketAction::Claim, name)?;

        if ticket.is_claimer(user_id) {
            self.release_slot(&ticket, user_id).await?;
            ticket.claimers.retain(|&id| id != user_id);

            tracing::info!("{} unclaimed {}", user_id, ticket.name);
            self.refresh_panel(&ticket).await;
            self.announce(
                &ticket,
                &format!(
                    "🔓 <@{}> left this ticket ({}/{})",
                    user_id,
                    ticket.claimers.len(),
                    ticket.max_claimers
                ),
            )
            .await;

            return Ok(ClaimResult::Unclaimed {
                claimers: ticket.claimers.len(),
                max_claimers: ticket.max_claimers,
            });
        }

        if ticket.is_full() {
            return Err(TicketError::CapacityExceeded {
                max: ticket.max_claimers,
            }
            .into());
        }

        let accounts = UserAccountRepository::new(&self.state.db);
        if let Some(active_ticket) = accounts.find(user_id).await?.and_then(|a| a.active_ticket) {
            if active_ticket != ticket.name {
                return Err(TicketError::AlreadyBusy { active_ticket }.into());
            }
        }

        if ticket.is_requester(user_id) {
            return Err(TicketError::SelfClaimForbidden.into());
        }

        let helper = self
            .state
            .directory
            .has_role(user_id, self.state.roles.helper)
            .await?;
        if !helper {
            return Err(TicketError::Unauthorized.into());
        }

        let txn = self.state.db.begin().await?;
        let accounts = UserAccountRepository::new(&txn);
        if !accounts.bind_active_ticket_if_idle(user_id, &ticket.name).await? {
            let active_ticket = accounts
                .find(user_id)
                .await?
                .and_then(|a| a.active_ticket)
                .unwrap_or_default();
            txn.rollback().await?;
            return Err(TicketError::AlreadyBusy { active_ticket }.into());
        }
        TicketRepository::new(&txn)
            .add_claimer(ticket.id, user_id, Utc::now())
            .await?;
        txn.commit().await?;

        ticket.claimers.push(user_id);

        tracing::info!(
            "{} claimed {} ({}/{})",
            user_id,
            ticket.name,
            ticket.claimers.len(),
            ticket.max_claimers
        );
        self.refresh_panel(&ticket).await;
        self.announce(
            &ticket,
            &format!(
                "✅ <@{}> claimed this ticket ({}/{})",
                user_id,
                ticket.claimers.len(),
                ticket.max_claimers
            ),
        )
        .await;

        Ok(ClaimResult::Claimed {
            claimers: ticket.claimers.len(),
            max_claimers: ticket.max_claimers,
        })
    }

    /// Evicts a claimer. Admin only, no points move.
    ///
    /// # Returns
    /// - `Ok(Ticket)` - Ticket without the evicted user
    /// - `Err(AppError::TicketErr(Unauthorized))` - Actor is not an admin
    /// - `Err(AppError::TicketErr(NotAClaimer))` - User does not hold a slot
    pub async fn remove_claimer(
        &self,
        name: &str,
        user_id: u64,
        actor_id: u64,
    ) -> Result<Ticket, AppError> {
        let _guard = self.state.locks.acquire(name).await;

        let mut ticket = self.require(name).await?;
        ticket.status.guard(TicketAction::RemoveClaimer, name)?;

        if !self.is_admin(actor_id).await? {
            return Err(TicketError::Unauthorized.into());
        }
        if !ticket.is_claimer(user_id) {
            return Err(TicketError::NotAClaimer(user_id).into());
        }

        self.release_slot(&ticket, user_id).await?;
        ticket.claimers.retain(|&id| id != user_id);

        tracing::info!("{} removed {} from {}", actor_id, user_id, ticket.name);
        self.refresh_panel(&ticket).await;
        self.announce(
            &ticket,
            &format!(
                "🚫 <@{}> was removed from this ticket ({}/{})",
                user_id,
                ticket.claimers.len(),
                ticket.max_claimers
            ),
        )
        .await;

        Ok(ticket)
    }

    /// Deletes the claimer row and the user's binding to this ticket together.
    async fn release_slot(&self, ticket: &Ticket, user_id: u64) -> Result<(), AppError> {
        let txn = self.state.db.begin().await?;
        TicketRepository::new(&txn)
            .remove_claimer(ticket.id, user_id)
            .await?;
        UserAccountRepository::new(&txn)
            .clear_active_ticket(user_id, Some(&ticket.name))
            .await?;
        txn.commit().await?;

        Ok(())
    }
}
