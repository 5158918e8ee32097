//! User account repository backing the points ledger and verification.
//!
//! Accounts are created lazily with `ensure` before any write. Point increments are
//! expressed as `points = points + ?` so concurrent credits never lose an update.

use chrono::{DateTime, Utc};
use migration::OnConflict;
use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveValue, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::server::{
    error::AppError,
    model::{
        account::{LeaderboardEntry, UserAccount},
        ticket::PointChange,
        verification::{GuildCount, VerificationStatus},
    },
    util::parse::parse_u64_from_string,
};

pub struct UserAccountRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserAccountRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Creates an empty account for the user unless one already exists.
    pub async fn ensure(&self, discord_id: u64) -> Result<(), DbErr> {
        entity::prelude::UserAccount::insert(entity::user_account::ActiveModel {
            discord_id: ActiveValue::Set(discord_id.to_string()),
            username: ActiveValue::Set(None),
            points: ActiveValue::Set(0),
            weekly_points: ActiveValue::Set(0),
            weekly_reset_at: ActiveValue::Set(None),
            tickets_claimed: ActiveValue::Set(0),
            active_ticket: ActiveValue::Set(None),
            external_name: ActiveValue::Set(None),
            external_id: ActiveValue::Set(None),
            external_guild: ActiveValue::Set(None),
            previous_names: ActiveValue::Set(serde_json::json!([])),
            verification_status: ActiveValue::Set(
                VerificationStatus::Unverified.as_str().to_string(),
            ),
            verified_at: ActiveValue::Set(None),
        })
        .on_conflict(
            OnConflict::column(entity::user_account::Column::DiscordId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(())
    }

    /// Finds an account by Discord id.
    ///
    /// # Returns
    /// - `Ok(Some(UserAccount))` - Account exists
    /// - `Ok(None)` - User never touched the ledger
    /// - `Err(AppError)` - Database error or malformed row
    pub async fn find(&self, discord_id: u64) -> Result<Option<UserAccount>, AppError> {
        entity::prelude::UserAccount::find_by_id(discord_id.to_string())
            .one(self.db)
            .await?
            .map(UserAccount::from_entity)
            .transpose()
    }

    /// Finds the accounts that exist among `discord_ids`.
    pub async fn find_many(&self, discord_ids: &[u64]) -> Result<Vec<UserAccount>, AppError> {
        if discord_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = discord_ids.iter().map(|id| id.to_string()).collect();
        entity::prelude::UserAccount::find()
            .filter(entity::user_account::Column::DiscordId.is_in(ids))
            .order_by_asc(entity::user_account::Column::DiscordId)
            .all(self.db)
            .await?
            .into_iter()
            .map(UserAccount::from_entity)
            .collect()
    }

    pub async fn all(&self) -> Result<Vec<UserAccount>, AppError> {
        entity::prelude::UserAccount::find()
            .order_by_asc(entity::user_account::Column::DiscordId)
            .all(self.db)
            .await?
            .into_iter()
            .map(UserAccount::from_entity)
            .collect()
    }

    /// Binds the user to a ticket only if they hold no other ticket.
    ///
    /// # Returns
    /// - `Ok(true)` - Binding written, or the user was already bound to this ticket
    /// - `Ok(false)` - The user is bound to another ticket
    pub async fn bind_active_ticket_if_idle(
        &self,
        discord_id: u64,
        ticket_name: &str,
    ) -> Result<bool, DbErr> {
        self.ensure(discord_id).await?;

        let result = entity::prelude::UserAccount::update_many()
            .col_expr(
                entity::user_account::Column::ActiveTicket,
                Expr::value(Some(ticket_name.to_string())),
            )
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()))
            .filter(
                Condition::any()
                    .add(entity::user_account::Column::ActiveTicket.is_null())
                    .add(entity::user_account::Column::ActiveTicket.eq(ticket_name)),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Binds the user to a ticket, replacing any existing binding.
    pub async fn set_active_ticket(&self, discord_id: u64, ticket_name: &str) -> Result<(), DbErr> {
        self.ensure(discord_id).await?;

        entity::prelude::UserAccount::update_many()
            .col_expr(
                entity::user_account::Column::ActiveTicket,
                Expr::value(Some(ticket_name.to_string())),
            )
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Clears the user's binding.
    ///
    /// # Arguments
    /// - `only_if` - When set, the binding is cleared only if it points at this ticket
    ///
    /// # Returns
    /// - `Ok(true)` - A binding was cleared
    /// - `Ok(false)` - No matching binding
    pub async fn clear_active_ticket(
        &self,
        discord_id: u64,
        only_if: Option<&str>,
    ) -> Result<bool, DbErr> {
        let mut query = entity::prelude::UserAccount::update_many()
            .col_expr(
                entity::user_account::Column::ActiveTicket,
                Expr::value(Option::<String>::None),
            )
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()))
            .filter(entity::user_account::Column::ActiveTicket.is_not_null());

        if let Some(ticket_name) = only_if {
            query = query.filter(entity::user_account::Column::ActiveTicket.eq(ticket_name));
        }

        let result = query.exec(self.db).await?;

        Ok(result.rows_affected == 1)
    }

    /// Adds `amount` to the user's lifetime points.
    ///
    /// # Arguments
    /// - `helped` - Also counts one more claimed ticket
    ///
    /// # Returns
    /// - `Ok(PointChange)` - Balance before and after the credit
    pub async fn credit(
        &self,
        discord_id: u64,
        amount: i64,
        helped: bool,
    ) -> Result<PointChange, DbErr> {
        self.ensure(discord_id).await?;

        let mut query = entity::prelude::UserAccount::update_many()
            .col_expr(
                entity::user_account::Column::Points,
                Expr::col(entity::user_account::Column::Points).add(amount),
            )
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()));

        if helped {
            query = query.col_expr(
                entity::user_account::Column::TicketsClaimed,
                Expr::col(entity::user_account::Column::TicketsClaimed).add(1),
            );
        }

        query.exec(self.db).await?;

        let after = self.points_of(discord_id).await?;

        Ok(PointChange {
            user_id: discord_id,
            before: after - amount,
            after,
        })
    }

    /// Overwrites the user's lifetime points.
    pub async fn set_points(&self, discord_id: u64, points: i64) -> Result<PointChange, DbErr> {
        self.ensure(discord_id).await?;
        let before = self.points_of(discord_id).await?;

        entity::prelude::UserAccount::update_many()
            .col_expr(entity::user_account::Column::Points, Expr::value(points))
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(PointChange {
            user_id: discord_id,
            before,
            after: points,
        })
    }

    /// Stores the weekly cap bookkeeping of a requester.
    pub async fn set_weekly(
        &self,
        discord_id: u64,
        weekly_points: i64,
        week_start: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        entity::prelude::UserAccount::update_many()
            .col_expr(
                entity::user_account::Column::WeeklyPoints,
                Expr::value(weekly_points),
            )
            .col_expr(
                entity::user_account::Column::WeeklyResetAt,
                Expr::value(Some(week_start)),
            )
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Zeroes points and claimed counters of every account in one statement.
    pub async fn zero_all_points(&self) -> Result<u64, DbErr> {
        let result = entity::prelude::UserAccount::update_many()
            .col_expr(entity::user_account::Column::Points, Expr::value(0i64))
            .col_expr(entity::user_account::Column::TicketsClaimed, Expr::value(0i64))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Top accounts by points, ties broken by Discord id so the order is stable.
    pub async fn top_by_points(&self, limit: u64) -> Result<Vec<LeaderboardEntry>, AppError> {
        entity::prelude::UserAccount::find()
            .order_by_desc(entity::user_account::Column::Points)
            .order_by_asc(entity::user_account::Column::DiscordId)
            .limit(limit)
            .all(self.db)
            .await?
            .into_iter()
            .map(|account| {
                Ok(LeaderboardEntry {
                    discord_id: parse_u64_from_string(&account.discord_id)?,
                    points: account.points,
                    tickets_claimed: account.tickets_claimed,
                })
            })
            .collect()
    }

    /// Number of accounts with strictly more points than `points`.
    pub async fn count_above(&self, points: i64) -> Result<u64, DbErr> {
        entity::prelude::UserAccount::find()
            .filter(entity::user_account::Column::Points.gt(points))
            .count(self.db)
            .await
    }

    /// Stores a successful verification.
    pub async fn bind_external(
        &self,
        discord_id: u64,
        external_name: &str,
        external_id: &str,
        guild: Option<&str>,
        previous_names: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        self.ensure(discord_id).await?;

        entity::prelude::UserAccount::update_many()
            .col_expr(
                entity::user_account::Column::ExternalName,
                Expr::value(Some(external_name.to_string())),
            )
            .col_expr(
                entity::user_account::Column::ExternalId,
                Expr::value(Some(external_id.to_string())),
            )
            .col_expr(
                entity::user_account::Column::ExternalGuild,
                Expr::value(guild.map(str::to_string)),
            )
            .col_expr(
                entity::user_account::Column::PreviousNames,
                Expr::value(serde_json::json!(previous_names)),
            )
            .col_expr(
                entity::user_account::Column::VerificationStatus,
                Expr::value(VerificationStatus::Verified.as_str()),
            )
            .col_expr(entity::user_account::Column::VerifiedAt, Expr::value(Some(now)))
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(())
    }

    pub async fn set_verification_status(
        &self,
        discord_id: u64,
        status: VerificationStatus,
    ) -> Result<(), DbErr> {
        self.ensure(discord_id).await?;

        entity::prelude::UserAccount::update_many()
            .col_expr(
                entity::user_account::Column::VerificationStatus,
                Expr::value(status.as_str()),
            )
            .filter(entity::user_account::Column::DiscordId.eq(discord_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Verified accounts whose external guild is `guild`, ignoring case.
    pub async fn verified_in_guild(&self, guild: &str) -> Result<Vec<UserAccount>, AppError> {
        let wanted = guild.to_lowercase();

        Ok(self
            .verified()
            .await?
            .into_iter()
            .filter(|account| {
                account
                    .external_guild
                    .as_deref()
                    .is_some_and(|g| g.to_lowercase() == wanted)
            })
            .collect())
    }

    /// Verified member counts per external guild, largest first.
    pub async fn verified_guild_counts(&self) -> Result<Vec<GuildCount>, AppError> {
        let mut counts: std::collections::BTreeMap<String, u64> = Default::default();
        for account in self.verified().await? {
            let guild = account
                .external_guild
                .unwrap_or_else(|| "No guild".to_string());
            *counts.entry(guild).or_default() += 1;
        }

        let mut counts: Vec<GuildCount> = counts
            .into_iter()
            .map(|(guild, members)| GuildCount { guild, members })
            .collect();
        counts.sort_by(|a, b| b.members.cmp(&a.members).then(a.guild.cmp(&b.guild)));

        Ok(counts)
    }

    async fn verified(&self) -> Result<Vec<UserAccount>, AppError> {
        entity::prelude::UserAccount::find()
            .filter(
                entity::user_account::Column::VerificationStatus
                    .eq(VerificationStatus::Verified.as_str()),
            )
            .order_by_asc(entity::user_account::Column::DiscordId)
            .all(self.db)
            .await?
            .into_iter()
            .map(UserAccount::from_entity)
            .collect()
    }

    async fn points_of(&self, discord_id: u64) -> Result<i64, DbErr> {
        let account = entity::prelude::UserAccount::find_by_id(discord_id.to_string())
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user_account {}", discord_id)))?;

        Ok(account.points)
    }
}
