use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;

use crate::server::{
    data::{ticket::TicketRepository, user_account::UserAccountRepository},
    error::{ledger::LedgerError, ticket::TicketError, AppError},
    model::{
        log::LogEvent,
        ticket::{
            CompletionOutcome, RequesterBonus, SettlementReceipt, Ticket, TicketAction,
        },
    },
    service::{confirmation::GateAction, points::weekly::apply_weekly_cap},
};

use super::{reward, TicketService};

impl<'a> TicketService<'a> {
    /// Entry point of the complete button.
    ///
    /// A ticket with free helper slots is not settled right away: a confirmation gate is
    /// opened and its id returned so the caller can ask the requester to confirm.
    ///
    /// # Returns
    /// - `Ok(CompletionOutcome::ConfirmationRequired)` - Fewer claimers than capacity
    /// - `Ok(CompletionOutcome::Settled)` - Ticket was full and is now settled
    /// - `Err(AppError::TicketErr(_))` - Missing, closed, locked or unauthorized
    pub async fn request_completion(
        &self,
        name: &str,
        actor_id: u64,
    ) -> Result<CompletionOutcome, AppError> {
        let ticket = self.require(name).await?;
        ticket.status.guard(TicketAction::Complete, name)?;
        self.authorize_completion(&ticket, actor_id).await?;

        if (ticket.claimers.len() as u32) < ticket.max_claimers {
            let gate_id = self
                .state
                .gates
                .open(
                    &ticket.name,
                    GateAction::Complete,
                    ticket.requester_id,
                    self.state.policy.confirmation_timeout,
                )
                .await;

            tracing::debug!(
                "{} asked to complete {} with {}/{} helpers, gate {}",
                actor_id,
                ticket.name,
                ticket.claimers.len(),
                ticket.max_claimers,
                gate_id
            );

            return Ok(CompletionOutcome::ConfirmationRequired { gate_id });
        }

        Ok(CompletionOutcome::Settled(self.settle(name, actor_id).await?))
    }

    /// Pays out a ticket. Runs at most once per ticket.
    ///
    /// The `open → completing` compare-and-set decides the single winner. Helper credits, the
    /// capped requester bonus, binding clears and the `completed` transition are then written
    /// in one transaction. If that transaction fails the ticket stays `completing` and the
    /// error is returned for an operator to reconcile; it is never retried here.
    ///
    /// # Returns
    /// - `Ok(SettlementReceipt)` - Ledger changes of this settlement
    /// - `Err(AppError::TicketErr(AlreadyLocked))` - Another caller settled or is settling
    /// - `Err(AppError::TicketErr(AlreadyClosed))` - Ticket was cancelled or closed
    pub async fn settle(&self, name: &str, actor_id: u64) -> Result<SettlementReceipt, AppError> {
        let guard = self.state.locks.acquire(name).await;

        let ticket = self.require(name).await?;
        ticket.status.guard(TicketAction::Complete, name)?;
        self.authorize_completion(&ticket, actor_id).await?;

        let now = Utc::now();
        let repo = TicketRepository::new(&self.state.db);
        if !repo.lock_for_settlement(name, actor_id, now).await? {
            let current = self.require(name).await?;
            let err = current
                .status
                .guard(TicketAction::Complete, name)
                .err()
                .unwrap_or_else(|| TicketError::AlreadyLocked(name.to_string()));
            return Err(err.into());
        }

        let receipt = match self.write_settlement(&ticket, actor_id, now).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::error!(
                    "Settlement of {} failed after locking, ticket left completing: {}",
                    ticket.name,
                    e
                );
                return Err(e);
            }
        };

        drop(guard);
        self.state.locks.release(name).await;

        tracing::info!(
            "{} settled by {}: {} helpers credited {} each, requester credited {}",
            ticket.name,
            actor_id,
            receipt.helpers.len(),
            ticket.points,
            receipt.requester.credited
        );

        if let Err(e) = self
            .state
            .notifier
            .log_event(LogEvent::TicketCompleted {
                ticket_name: ticket.name.clone(),
                settled_by: actor_id,
                bosses: ticket.bosses.clone(),
                helpers: receipt.helpers.clone(),
                requester: receipt.requester.clone(),
            })
            .await
        {
            tracing::error!("Failed to log settlement of {}: {}", ticket.name, e);
        }

        self.finish_terminal(&ticket).await;

        Ok(receipt)
    }

    async fn write_settlement(
        &self,
        ticket: &Ticket,
        actor_id: u64,
        now: DateTime<Utc>,
    ) -> Result<SettlementReceipt, AppError> {
        let txn = self.state.db.begin().await?;
        let accounts = UserAccountRepository::new(&txn);

        let mut helpers = Vec::with_capacity(ticket.claimers.len());
        for &helper in ticket
            .claimers
            .iter()
            .filter(|&&id| !ticket.is_requester(id))
        {
            helpers.push(accounts.credit(helper, ticket.points, true).await?);
            accounts
                .clear_active_ticket(helper, Some(&ticket.name))
                .await?;
        }

        let requester_id = ticket.requester_id;
        accounts.ensure(requester_id).await?;
        let account = accounts
            .find(requester_id)
            .await?
            .ok_or(LedgerError::UnknownUser(requester_id))?;

        let attempted =
            reward::requester_reward(&ticket.ticket_type, ticket.points, ticket.bosses.len());
        let cap = apply_weekly_cap(
            account.weekly_points,
            account.weekly_reset_at,
            now,
            self.state.policy.weekly_requester_cap,
            attempted,
        );
        accounts
            .set_weekly(requester_id, cap.weekly_points, cap.week_start)
            .await?;
        let change = accounts.credit(requester_id, cap.credited, false).await?;
        accounts
            .clear_active_ticket(requester_id, Some(&ticket.name))
            .await?;

        if !TicketRepository::new(&txn).mark_completed(&ticket.name).await? {
            txn.rollback().await?;
            return Err(TicketError::AlreadyLocked(ticket.name.clone()).into());
        }

        txn.commit().await?;

        Ok(SettlementReceipt {
            ticket_name: ticket.name.clone(),
            settled_by: actor_id,
            helpers,
            requester: RequesterBonus {
                user_id: requester_id,
                attempted,
                credited: cap.credited,
                change,
            },
        })
    }
}
