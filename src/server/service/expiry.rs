//! Periodic sweep of open tickets.
//!
//! Idle tickets get one reminder after `reminder_after` and are closed after
//! `auto_close_after`, without any ledger movement. Tickets whose channel disappeared are
//! closed right away so they are not visited again. One failing ticket never stops the sweep.

use chrono::{DateTime, Duration, Utc};

use crate::server::{
    data::ticket::TicketRepository,
    error::AppError,
    model::ticket::{Ticket, TicketStatus},
    service::ticket::TicketService,
    state::AppState,
};

/// Age after which an open ticket without a channel counts as orphaned.
const CHANNEL_GRACE_SECS: i64 = 120;

/// Ticket names touched by one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub reminded: Vec<String>,
    pub closed: Vec<String>,
    pub orphaned: Vec<String>,
    pub failed: Vec<String>,
}

enum SweepAction {
    Close { orphaned: bool },
    Remind,
    Nothing,
}

pub struct ExpiryService<'a> {
    state: &'a AppState,
}

impl<'a> ExpiryService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Visits every open ticket once.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let tickets = TicketRepository::new(&self.state.db)
            .list_by_status(TicketStatus::Open)
            .await?;

        let mut report = SweepReport::default();
        for ticket in tickets {
            if let Err(e) = self.visit(&ticket, now, &mut report).await {
                tracing::error!("Expiry sweep failed for {}: {}", ticket.name, e);
                report.failed.push(ticket.name.clone());
            }
        }

        if !report.reminded.is_empty() || !report.closed.is_empty() {
            tracing::info!(
                "Expiry sweep: {} reminded, {} closed ({} orphaned), {} failed",
                report.reminded.len(),
                report.closed.len(),
                report.orphaned.len(),
                report.failed.len()
            );
        }

        Ok(report)
    }

    async fn visit(
        &self,
        ticket: &Ticket,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> Result<(), AppError> {
        match self.decide(ticket, now).await? {
            SweepAction::Close { orphaned } => {
                if TicketService::new(self.state)
                    .auto_close(&ticket.name, orphaned)
                    .await?
                {
                    report.closed.push(ticket.name.clone());
                    if orphaned {
                        report.orphaned.push(ticket.name.clone());
                    }
                }
            }
            SweepAction::Remind => {
                let first = TicketRepository::new(&self.state.db)
                    .mark_reminder_sent(&ticket.name)
                    .await?;
                if first {
                    self.remind(ticket).await;
                    report.reminded.push(ticket.name.clone());
                }
            }
            SweepAction::Nothing => {}
        }

        Ok(())
    }

    async fn decide(&self, ticket: &Ticket, now: DateTime<Utc>) -> Result<SweepAction, AppError> {
        let age = now - ticket.created_at;
        let policy = &self.state.policy;

        // A ticket without a channel may still be materializing.
        let Some(channel_id) = ticket.channel_id else {
            if age >= Duration::seconds(CHANNEL_GRACE_SECS) {
                return Ok(SweepAction::Close { orphaned: true });
            }
            return Ok(SweepAction::Nothing);
        };
        if !self.state.notifier.channel_exists(channel_id).await? {
            return Ok(SweepAction::Close { orphaned: true });
        }

        if age >= policy.auto_close_after {
            return Ok(SweepAction::Close { orphaned: false });
        }
        if age >= policy.reminder_after && !ticket.reminder_sent {
            return Ok(SweepAction::Remind);
        }

        Ok(SweepAction::Nothing)
    }

    async fn remind(&self, ticket: &Ticket) {
        let Some(channel_id) = ticket.channel_id else {
            return;
        };

        let content = format!(
            "⏰ <@{}> this ticket has been open for a while. Complete or cancel it if you no \
             longer need help, it closes automatically after {} hours.",
            ticket.requester_id,
            self.state.policy.auto_close_after.num_hours()
        );
        if let Err(e) = self
            .state
            .notifier
            .send_channel_message(channel_id, &content)
            .await
        {
            tracing::warn!("Failed to send reminder for {}: {}", ticket.name, e);
        }
    }
}
