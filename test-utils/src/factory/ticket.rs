//! Ticket and claimer factories.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr};

/// Factory for creating tickets with customizable fields.
///
/// Defaults describe an open "Daily 4 Man" ticket for a single boss worth one point,
/// with room for three helpers and a bound channel.
pub struct TicketFactory<'a, C: ConnectionTrait> {
    db: &'a C,
    id: i64,
    status: String,
    requester_id: String,
    ticket_type: String,
    bosses: Vec<String>,
    points: i64,
    max_claimers: i32,
    total_kills: Option<i32>,
    channel_id: Option<String>,
    reminder_sent: bool,
    last_helper_ping: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl<'a, C: ConnectionTrait> TicketFactory<'a, C> {
    pub fn new(db: &'a C) -> Self {
        let id = 1_000 + next_id() as i64;
        Self {
            db,
            id,
            status: "open".to_string(),
            requester_id: (900_000 + id).to_string(),
            ticket_type: "Daily 4 Man".to_string(),
            bosses: vec!["Ultra Warden".to_string()],
            points: 1,
            max_claimers: 3,
            total_kills: None,
            channel_id: Some((500_000 + id).to_string()),
            reminder_sent: false,
            last_helper_ping: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the ticket id. The name follows as `ticket-{id:03}`.
    pub fn id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn requester_id(mut self, requester_id: impl Into<String>) -> Self {
        self.requester_id = requester_id.into();
        self
    }

    pub fn ticket_type(mut self, ticket_type: impl Into<String>) -> Self {
        self.ticket_type = ticket_type.into();
        self
    }

    pub fn bosses(mut self, bosses: &[&str]) -> Self {
        self.bosses = bosses.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn points(mut self, points: i64) -> Self {
        self.points = points;
        self
    }

    pub fn max_claimers(mut self, max_claimers: i32) -> Self {
        self.max_claimers = max_claimers;
        self
    }

    pub fn total_kills(mut self, total_kills: i32) -> Self {
        self.total_kills = Some(total_kills);
        self
    }

    /// Sets the bound channel, `None` leaves the ticket without a channel.
    pub fn channel_id(mut self, channel_id: Option<u64>) -> Self {
        self.channel_id = channel_id.map(|c| c.to_string());
        self
    }

    pub fn reminder_sent(mut self, reminder_sent: bool) -> Self {
        self.reminder_sent = reminder_sent;
        self
    }

    pub fn last_helper_ping(mut self, at: DateTime<Utc>) -> Self {
        self.last_helper_ping = Some(at);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub async fn build(self) -> Result<entity::ticket::Model, DbErr> {
        entity::ticket::ActiveModel {
            id: ActiveValue::Set(self.id),
            name: ActiveValue::Set(format!("ticket-{:03}", self.id)),
            status: ActiveValue::Set(self.status),
            requester_id: ActiveValue::Set(self.requester_id),
            ticket_type: ActiveValue::Set(self.ticket_type),
            server: ActiveValue::Set("Twilly".to_string()),
            room: ActiveValue::Set("1234".to_string()),
            username: ActiveValue::Set("Hero".to_string()),
            bosses: ActiveValue::Set(serde_json::json!(self.bosses)),
            points: ActiveValue::Set(self.points),
            max_claimers: ActiveValue::Set(self.max_claimers),
            total_kills: ActiveValue::Set(self.total_kills),
            channel_id: ActiveValue::Set(self.channel_id),
            message_id: ActiveValue::Set(None),
            reminder_sent: ActiveValue::Set(self.reminder_sent),
            last_helper_ping: ActiveValue::Set(self.last_helper_ping),
            closed_by: ActiveValue::Set(None),
            closed_at: ActiveValue::Set(None),
            auto_closed: ActiveValue::Set(false),
            created_at: ActiveValue::Set(self.created_at),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an open ticket with default values.
pub async fn create_ticket<C: ConnectionTrait>(db: &C) -> Result<entity::ticket::Model, DbErr> {
    TicketFactory::new(db).build().await
}

/// Adds a claimer row for a ticket.
pub async fn create_claimer<C: ConnectionTrait>(
    db: &C,
    ticket_id: i64,
    user_id: impl Into<String>,
) -> Result<entity::ticket_claimer::Model, DbErr> {
    entity::ticket_claimer::ActiveModel {
        ticket_id: ActiveValue::Set(ticket_id),
        user_id: ActiveValue::Set(user_id.into()),
        claimed_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
}
