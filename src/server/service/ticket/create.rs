use chrono::Utc;
use sea_orm::TransactionTrait;

use crate::server::{
    data::{
        sequence::{SequenceRepository, TICKET_SEQUENCE},
        ticket::TicketRepository,
        user_account::UserAccountRepository,
    },
    error::{ticket::TicketError, AppError},
    model::ticket::{ChannelSpec, CreateTicketParams, NewTicket, Ticket},
};

use super::{reward, TicketService};

impl<'a> TicketService<'a> {
    /// Opens a ticket for a requester.
    ///
    /// Allocates the next id from the ticket sequence, derives points and helper capacity from
    /// the boss rules, binds the requester to the ticket and materializes its channel and
    /// panel. When the channel cannot be created the ticket row and binding are removed again.
    ///
    /// # Returns
    /// - `Ok(Ticket)` - Open ticket with channel and panel handles
    /// - `Err(AppError::TicketErr(InvalidInput))` - Bad room, bosses, kills or helper count
    /// - `Err(AppError::TicketErr(AlreadyBusy))` - Requester holds a ticket and the idle
    ///   policy is enabled
    /// - `Err(AppError::PlatformErr)` - Ticket channel could not be created
    pub async fn create(&self, params: CreateTicketParams) -> Result<Ticket, AppError> {
        let params = validate(params)?;
        let policy = &self.state.policy;

        let rules = self.state.rules.get_or_load(&self.state.db).await?;
        let points = reward::ticket_points(
            &params.ticket_type,
            &params.bosses,
            params.total_kills,
            &rules,
        )?;
        let max_claimers = reward::capacity(
            &params.ticket_type,
            &params.bosses,
            params.max_claimers,
            policy,
        )?;

        if policy.requester_must_be_idle {
            let account = UserAccountRepository::new(&self.state.db)
                .find(params.requester_id)
                .await?;
            if let Some(active_ticket) = account.and_then(|a| a.active_ticket) {
                return Err(TicketError::AlreadyBusy { active_ticket }.into());
            }
        }

        let txn = self.state.db.begin().await?;

        let id = SequenceRepository::new(&txn).next(TICKET_SEQUENCE).await?;
        let ticket = TicketRepository::new(&txn)
            .insert(NewTicket {
                id,
                requester_id: params.requester_id,
                ticket_type: params.ticket_type,
                server: params.server,
                room: params.room,
                username: params.username,
                bosses: params.bosses,
                points,
                max_claimers,
                total_kills: params.total_kills,
                created_at: Utc::now(),
            })
            .await?;

        let accounts = UserAccountRepository::new(&txn);
        if policy.requester_must_be_idle {
            if !accounts
                .bind_active_ticket_if_idle(ticket.requester_id, &ticket.name)
                .await?
            {
                let active_ticket = accounts
                    .find(ticket.requester_id)
                    .await?
                    .and_then(|a| a.active_ticket)
                    .unwrap_or_default();
                txn.rollback().await?;
                return Err(TicketError::AlreadyBusy { active_ticket }.into());
            }
        } else {
            accounts
                .set_active_ticket(ticket.requester_id, &ticket.name)
                .await?;
        }

        txn.commit().await?;

        tracing::info!(
            "Opened {} for {} ({} points, {} helpers)",
            ticket.name,
            ticket.requester_id,
            ticket.points,
            ticket.max_claimers
        );

        match self.materialize(ticket.clone()).await {
            Ok(ticket) => Ok(ticket),
            Err(e) => {
                tracing::error!("Failed to create channel for {}: {}", ticket.name, e);
                self.discard(&ticket).await;
                Err(e)
            }
        }
    }

    /// Creates the channel and panel of a freshly stored ticket.
    ///
    /// A panel that fails to render is logged only. The channel exists, and restoring open
    /// tickets renders the missing panel later.
    async fn materialize(&self, mut ticket: Ticket) -> Result<Ticket, AppError> {
        let repo = TicketRepository::new(&self.state.db);

        let channel_id = self
            .state
            .notifier
            .create_ticket_channel(&ChannelSpec {
                name: ticket.name.clone(),
                requester_id: ticket.requester_id,
            })
            .await?;
        repo.set_panel(&ticket.name, channel_id, None).await?;
        ticket.channel_id = Some(channel_id);

        match self.state.notifier.render_ticket_panel(&ticket).await {
            Ok(handle) => {
                repo.set_panel(&ticket.name, channel_id, Some(handle.message_id))
                    .await?;
                ticket.message_id = Some(handle.message_id);
            }
            Err(e) => {
                tracing::error!("Failed to render panel of {}: {}", ticket.name, e);
            }
        }

        Ok(ticket)
    }

    /// Removes a ticket whose channel never materialized.
    async fn discard(&self, ticket: &Ticket) {
        if let Err(e) = TicketRepository::new(&self.state.db)
            .delete(&ticket.name)
            .await
        {
            tracing::error!("Failed to delete unmaterialized {}: {}", ticket.name, e);
        }

        if let Err(e) = UserAccountRepository::new(&self.state.db)
            .clear_active_ticket(ticket.requester_id, Some(&ticket.name))
            .await
        {
            tracing::error!(
                "Failed to clear binding of {} to {}: {}",
                ticket.requester_id,
                ticket.name,
                e
            );
        }
    }
}

/// Trims free text and rejects malformed creation input.
fn validate(mut params: CreateTicketParams) -> Result<CreateTicketParams, TicketError> {
    params.server = params.server.trim().to_string();
    params.room = params.room.trim().to_string();
    params.username = params.username.trim().to_string();
    params.bosses = params
        .bosses
        .iter()
        .map(|boss| boss.trim().to_string())
        .filter(|boss| !boss.is_empty())
        .collect();

    if params.bosses.is_empty() {
        return Err(TicketError::InvalidInput(
            "Select at least one boss".to_string(),
        ));
    }
    if params.room.is_empty() || !params.room.chars().all(|c| c.is_ascii_digit()) {
        return Err(TicketError::InvalidInput("Room must be a number".to_string()));
    }
    if params.username.is_empty() {
        return Err(TicketError::InvalidInput(
            "In-game name must not be empty".to_string(),
        ));
    }
    if params.server.is_empty() {
        return Err(TicketError::InvalidInput(
            "Server must not be empty".to_string(),
        ));
    }
    if params
        .total_kills
        .is_some_and(|kills| kills > reward::MAX_TOTAL_KILLS)
    {
        return Err(TicketError::InvalidInput(format!(
            "Total kills must be at most {}",
            reward::MAX_TOTAL_KILLS
        )));
    }

    Ok(params)
}
