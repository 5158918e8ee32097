//! Ticket repository.
//!
//! Status changes go through compare-and-set updates (`UPDATE … WHERE status = ?`). The
//! number of affected rows tells the caller whether it won the transition, which is what
//! makes settlement, cancellation and auto-close at-most-once.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};

use crate::server::{
    error::{ticket::TicketError, AppError},
    model::ticket::{ticket_name, NewTicket, Ticket, TicketStatus},
};

pub struct TicketRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TicketRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Inserts a new open ticket with no claimers and no channel yet.
    ///
    /// # Returns
    /// - `Ok(Ticket)` - The stored ticket
    /// - `Err(AppError::TicketErr(InvalidInput))` - Kill count does not fit the column
    /// - `Err(AppError::DbErr)` - Insert failed, e.g. duplicate id or name
    pub async fn insert(&self, new: NewTicket) -> Result<Ticket, AppError> {
        let total_kills = new
            .total_kills
            .map(i32::try_from)
            .transpose()
            .map_err(|_| TicketError::InvalidInput("Total kills is too large".to_string()))?;

        let entity = entity::ticket::ActiveModel {
            id: ActiveValue::Set(new.id),
            name: ActiveValue::Set(ticket_name(new.id)),
            status: ActiveValue::Set(TicketStatus::Open.as_str().to_string()),
            requester_id: ActiveValue::Set(new.requester_id.to_string()),
            ticket_type: ActiveValue::Set(new.ticket_type.label().to_string()),
            server: ActiveValue::Set(new.server),
            room: ActiveValue::Set(new.room),
            username: ActiveValue::Set(new.username),
            bosses: ActiveValue::Set(serde_json::json!(new.bosses)),
            points: ActiveValue::Set(new.points),
            max_claimers: ActiveValue::Set(new.max_claimers as i32),
            total_kills: ActiveValue::Set(total_kills),
            channel_id: ActiveValue::Set(None),
            message_id: ActiveValue::Set(None),
            reminder_sent: ActiveValue::Set(false),
            last_helper_ping: ActiveValue::Set(None),
            closed_by: ActiveValue::Set(None),
            closed_at: ActiveValue::Set(None),
            auto_closed: ActiveValue::Set(false),
            created_at: ActiveValue::Set(new.created_at),
        }
        .insert(self.db)
        .await?;

        Ticket::from_entity(entity, Vec::new())
    }

    /// Finds a ticket by name together with its claimers.
    ///
    /// # Returns
    /// - `Ok(Some(Ticket))` - Ticket found
    /// - `Ok(None)` - No ticket with that name
    /// - `Err(AppError)` - Database error or malformed row
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Ticket>, AppError> {
        let Some(entity) = entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::Name.eq(name))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let claimers = entity::prelude::TicketClaimer::find()
            .filter(entity::ticket_claimer::Column::TicketId.eq(entity.id))
            .all(self.db)
            .await?;

        Ok(Some(Ticket::from_entity(entity, claimers)?))
    }

    /// Lists tickets in a status, oldest first, with their claimers.
    pub async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>, AppError> {
        entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::Status.eq(status.as_str()))
            .order_by_asc(entity::ticket::Column::Id)
            .find_with_related(entity::prelude::TicketClaimer)
            .all(self.db)
            .await?
            .into_iter()
            .map(|(ticket, claimers)| Ticket::from_entity(ticket, claimers))
            .collect()
    }

    /// Lists tickets whose settlement lock was taken before `older_than` and never released.
    pub async fn list_stuck(&self, older_than: DateTime<Utc>) -> Result<Vec<Ticket>, AppError> {
        entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::Status.eq(TicketStatus::Completing.as_str()))
            .filter(entity::ticket::Column::ClosedAt.lt(older_than))
            .order_by_asc(entity::ticket::Column::Id)
            .find_with_related(entity::prelude::TicketClaimer)
            .all(self.db)
            .await?
            .into_iter()
            .map(|(ticket, claimers)| Ticket::from_entity(ticket, claimers))
            .collect()
    }

    /// Moves an open ticket to `completing`, recording who settles it.
    ///
    /// # Returns
    /// - `Ok(true)` - This caller holds the settlement lock
    /// - `Ok(false)` - The ticket was not open, someone else got there first
    pub async fn lock_for_settlement(
        &self,
        name: &str,
        actor_id: u64,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(
                entity::ticket::Column::Status,
                Expr::value(TicketStatus::Completing.as_str()),
            )
            .col_expr(
                entity::ticket::Column::ClosedBy,
                Expr::value(Some(actor_id.to_string())),
            )
            .col_expr(entity::ticket::Column::ClosedAt, Expr::value(Some(now)))
            .filter(entity::ticket::Column::Name.eq(name))
            .filter(entity::ticket::Column::Status.eq(TicketStatus::Open.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Releases the settlement lock into `completed`.
    pub async fn mark_completed(&self, name: &str) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(
                entity::ticket::Column::Status,
                Expr::value(TicketStatus::Completed.as_str()),
            )
            .filter(entity::ticket::Column::Name.eq(name))
            .filter(entity::ticket::Column::Status.eq(TicketStatus::Completing.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Moves an open ticket straight into `cancelled` or `closed`.
    ///
    /// # Arguments
    /// - `closed_by` - Actor, `None` for the expiry sweep
    /// - `auto_closed` - Set when the sweep expired the ticket
    ///
    /// # Returns
    /// - `Ok(true)` - Transition applied
    /// - `Ok(false)` - Ticket was no longer open
    pub async fn close_open(
        &self,
        name: &str,
        status: TicketStatus,
        closed_by: Option<u64>,
        auto_closed: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(entity::ticket::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                entity::ticket::Column::ClosedBy,
                Expr::value(closed_by.map(|id| id.to_string())),
            )
            .col_expr(entity::ticket::Column::ClosedAt, Expr::value(Some(now)))
            .col_expr(entity::ticket::Column::AutoClosed, Expr::value(auto_closed))
            .filter(entity::ticket::Column::Name.eq(name))
            .filter(entity::ticket::Column::Status.eq(TicketStatus::Open.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Stores the channel and panel message of a ticket.
    pub async fn set_panel(
        &self,
        name: &str,
        channel_id: u64,
        message_id: Option<u64>,
    ) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(
                entity::ticket::Column::ChannelId,
                Expr::value(Some(channel_id.to_string())),
            )
            .col_expr(
                entity::ticket::Column::MessageId,
                Expr::value(message_id.map(|id| id.to_string())),
            )
            .filter(entity::ticket::Column::Name.eq(name))
            .exec(self.db)
            .await?;

        Ok(())
    }

    pub async fn add_claimer(
        &self,
        ticket_id: i64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        entity::ticket_claimer::ActiveModel {
            ticket_id: ActiveValue::Set(ticket_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            claimed_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(())
    }

    /// Removes a claimer row.
    ///
    /// # Returns
    /// - `Ok(true)` - The user was a claimer and was removed
    /// - `Ok(false)` - The user was not a claimer
    pub async fn remove_claimer(&self, ticket_id: i64, user_id: u64) -> Result<bool, DbErr> {
        let result = entity::prelude::TicketClaimer::delete_many()
            .filter(entity::ticket_claimer::Column::TicketId.eq(ticket_id))
            .filter(entity::ticket_claimer::Column::UserId.eq(user_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Flags the idle reminder as sent.
    ///
    /// # Returns
    /// - `Ok(true)` - This caller flipped the flag and should send the reminder
    /// - `Ok(false)` - Already sent or the ticket is no longer open
    pub async fn mark_reminder_sent(&self, name: &str) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(entity::ticket::Column::ReminderSent, Expr::value(true))
            .filter(entity::ticket::Column::Name.eq(name))
            .filter(entity::ticket::Column::ReminderSent.eq(false))
            .filter(entity::ticket::Column::Status.eq(TicketStatus::Open.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    pub async fn record_helper_ping(&self, name: &str, now: DateTime<Utc>) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(entity::ticket::Column::LastHelperPing, Expr::value(Some(now)))
            .filter(entity::ticket::Column::Name.eq(name))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Deletes a ticket and its claimers.
    pub async fn delete(&self, name: &str) -> Result<bool, DbErr> {
        let Some(ticket) = entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::Name.eq(name))
            .one(self.db)
            .await?
        else {
            return Ok(false);
        };

        entity::prelude::TicketClaimer::delete_many()
            .filter(entity::ticket_claimer::Column::TicketId.eq(ticket.id))
            .exec(self.db)
            .await?;

        let result = entity::prelude::Ticket::delete_many()
            .filter(entity::ticket::Column::Name.eq(name))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
