//! User account factory.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr};

/// Factory for creating ledger accounts with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// let account = UserAccountFactory::new(&db)
///     .discord_id("123456789")
///     .points(40)
///     .build()
///     .await?;
/// ```
pub struct UserAccountFactory<'a, C: ConnectionTrait> {
    db: &'a C,
    discord_id: String,
    username: Option<String>,
    points: i64,
    weekly_points: i64,
    weekly_reset_at: Option<DateTime<Utc>>,
    tickets_claimed: i64,
    active_ticket: Option<String>,
    external_name: Option<String>,
    external_guild: Option<String>,
    previous_names: Vec<String>,
    verification_status: String,
}

impl<'a, C: ConnectionTrait> UserAccountFactory<'a, C> {
    /// Creates a factory with zeroed balances and an unverified status.
    ///
    /// The Discord id defaults to a unique numeric string.
    pub fn new(db: &'a C) -> Self {
        let id = next_id();
        Self {
            db,
            discord_id: (100_000 + id).to_string(),
            username: Some(format!("user{}", id)),
            points: 0,
            weekly_points: 0,
            weekly_reset_at: None,
            tickets_claimed: 0,
            active_ticket: None,
            external_name: None,
            external_guild: None,
            previous_names: Vec::new(),
            verification_status: "unverified".to_string(),
        }
    }

    pub fn discord_id(mut self, discord_id: impl Into<String>) -> Self {
        self.discord_id = discord_id.into();
        self
    }

    pub fn points(mut self, points: i64) -> Self {
        self.points = points;
        self
    }

    pub fn weekly_points(mut self, weekly_points: i64, reset_at: DateTime<Utc>) -> Self {
        self.weekly_points = weekly_points;
        self.weekly_reset_at = Some(reset_at);
        self
    }

    pub fn tickets_claimed(mut self, tickets_claimed: i64) -> Self {
        self.tickets_claimed = tickets_claimed;
        self
    }

    pub fn active_ticket(mut self, ticket_name: impl Into<String>) -> Self {
        self.active_ticket = Some(ticket_name.into());
        self
    }

    /// Marks the account as verified against an external character.
    pub fn verified(mut self, name: impl Into<String>, guild: Option<&str>) -> Self {
        self.external_name = Some(name.into());
        self.external_guild = guild.map(str::to_string);
        self.verification_status = "verified".to_string();
        self
    }

    pub fn previous_names(mut self, names: &[&str]) -> Self {
        self.previous_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Builds and inserts the account.
    pub async fn build(self) -> Result<entity::user_account::Model, DbErr> {
        let verified_at = (self.verification_status == "verified").then(Utc::now);
        entity::user_account::ActiveModel {
            discord_id: ActiveValue::Set(self.discord_id),
            username: ActiveValue::Set(self.username),
            points: ActiveValue::Set(self.points),
            weekly_points: ActiveValue::Set(self.weekly_points),
            weekly_reset_at: ActiveValue::Set(self.weekly_reset_at),
            tickets_claimed: ActiveValue::Set(self.tickets_claimed),
            active_ticket: ActiveValue::Set(self.active_ticket),
            external_name: ActiveValue::Set(self.external_name),
            external_id: ActiveValue::Set(None),
            external_guild: ActiveValue::Set(self.external_guild),
            previous_names: ActiveValue::Set(serde_json::json!(self.previous_names)),
            verification_status: ActiveValue::Set(self.verification_status),
            verified_at: ActiveValue::Set(verified_at),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an account with default values.
pub async fn create_account<C: ConnectionTrait>(
    db: &C,
) -> Result<entity::user_account::Model, DbErr> {
    UserAccountFactory::new(db).build().await
}

/// Creates an account with a specific Discord id and balance.
pub async fn create_account_with_points<C: ConnectionTrait>(
    db: &C,
    discord_id: impl Into<String>,
    points: i64,
) -> Result<entity::user_account::Model, DbErr> {
    UserAccountFactory::new(db)
        .discord_id(discord_id)
        .points(points)
        .build()
        .await
}
