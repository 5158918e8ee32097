//! Points ledger operations outside of ticket settlement.
//!
//! Manual credits, absolute sets, bulk adjustments and the archive-and-reset of the whole
//! ledger. Multi-user writes run in one transaction so readers never see a half-applied
//! adjustment or reset.

pub mod weekly;

use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;

use crate::server::{
    data::{points_archive::PointsArchiveRepository, user_account::UserAccountRepository},
    error::{ledger::LedgerError, AppError},
    model::{
        account::{AdjustTarget, LeaderboardEntry, PointsArchive, Standing},
        log::LogEvent,
        ticket::PointChange,
    },
    service::leaderboard::LeaderboardService,
    state::AppState,
};

/// Upper bound of an absolute point value.
pub const MAX_POINTS: i64 = 1_000_000;

/// Archive id format, one archive per second at most before a suffix is needed.
const ARCHIVE_ID_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub struct PointsService<'a> {
    state: &'a AppState,
}

impl<'a> PointsService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Adds `amount` to one user's lifetime points.
    pub async fn credit(&self, user_id: u64, amount: i64) -> Result<PointChange, AppError> {
        let change = UserAccountRepository::new(&self.state.db)
            .credit(user_id, amount, false)
            .await?;

        tracing::info!(
            "Credited {} points to {} ({} -> {})",
            amount,
            user_id,
            change.before,
            change.after
        );

        Ok(change)
    }

    /// Overwrites a user's points.
    ///
    /// # Returns
    /// - `Ok(PointChange)` - Previous and new balance
    /// - `Err(AppError::LedgerErr(InvalidInput))` - Value outside `0..=1_000_000`
    pub async fn set_absolute(
        &self,
        actor_id: u64,
        user_id: u64,
        points: i64,
    ) -> Result<PointChange, AppError> {
        if !(0..=MAX_POINTS).contains(&points) {
            return Err(LedgerError::InvalidInput(format!(
                "Points must be between 0 and {}",
                MAX_POINTS
            ))
            .into());
        }

        let change = UserAccountRepository::new(&self.state.db)
            .set_points(user_id, points)
            .await?;

        tracing::info!(
            "{} set points of {} to {} (was {})",
            actor_id,
            user_id,
            change.after,
            change.before
        );

        self.log(LogEvent::PointsSet {
            actor: actor_id,
            change: change.clone(),
        })
        .await;
        self.refresh_leaderboard().await;

        Ok(change)
    }

    /// Adds `delta` to every targeted user that has an account, flooring at 0.
    ///
    /// Role targets are expanded through the guild directory. Users without an account are
    /// skipped.
    pub async fn adjust_bulk(
        &self,
        actor_id: u64,
        target: AdjustTarget,
        delta: i64,
    ) -> Result<Vec<PointChange>, AppError> {
        if delta == 0 {
            return Err(LedgerError::InvalidInput("Delta must not be 0".to_string()).into());
        }

        let mut user_ids = match target {
            AdjustTarget::Users(ids) => ids,
            AdjustTarget::Role(role_id) => self.state.directory.role_members(role_id).await?,
        };
        user_ids.sort_unstable();
        user_ids.dedup();

        let txn = self.state.db.begin().await?;
        let accounts = UserAccountRepository::new(&txn);
        let mut changes = Vec::new();
        for account in accounts.find_many(&user_ids).await? {
            let after = (account.points + delta).max(0);
            let change = accounts.set_points(account.discord_id, after).await?;
            changes.push(change);
        }
        txn.commit().await?;

        tracing::info!(
            "{} adjusted {} accounts by {}",
            actor_id,
            changes.len(),
            delta
        );

        self.log(LogEvent::PointsAdjusted {
            actor: actor_id,
            delta,
            changes: changes.clone(),
        })
        .await;
        self.refresh_leaderboard().await;

        Ok(changes)
    }

    /// Snapshots every account's points under a new archive id, then zeroes the ledger.
    ///
    /// Both steps share one transaction.
    ///
    /// # Returns
    /// - `Ok(PointsArchive)` - The stored snapshot
    pub async fn archive_and_reset_all(&self, actor_id: u64) -> Result<PointsArchive, AppError> {
        let now = Utc::now();

        let txn = self.state.db.begin().await?;
        let archives = PointsArchiveRepository::new(&txn);
        let accounts = UserAccountRepository::new(&txn);

        let id = unique_archive_id(&archives, now).await?;
        let entries: Vec<LeaderboardEntry> = accounts
            .all()
            .await?
            .into_iter()
            .map(|account| LeaderboardEntry {
                discord_id: account.discord_id,
                points: account.points,
                tickets_claimed: account.tickets_claimed,
            })
            .collect();

        archives.create(&id, actor_id, now, &entries).await?;
        let zeroed = accounts.zero_all_points().await?;
        let archive = archives
            .find(&id)
            .await?
            .ok_or_else(|| LedgerError::UnknownArchive(id.clone()))?;

        txn.commit().await?;

        tracing::info!(
            "{} archived and reset {} accounts as {}",
            actor_id,
            zeroed,
            archive.id
        );

        self.log(LogEvent::PointsReset {
            actor: actor_id,
            archive_id: archive.id.clone(),
            users: archive.entries.len(),
        })
        .await;
        self.refresh_leaderboard().await;

        Ok(archive)
    }

    pub async fn read_archive(&self, id: &str) -> Result<PointsArchive, AppError> {
        PointsArchiveRepository::new(&self.state.db)
            .find(id)
            .await?
            .ok_or_else(|| LedgerError::UnknownArchive(id.to_string()).into())
    }

    pub async fn list_archives(&self) -> Result<Vec<String>, AppError> {
        Ok(PointsArchiveRepository::new(&self.state.db)
            .list_ids()
            .await?)
    }

    /// Highest balances, ties broken by user id.
    pub async fn top_n(&self, limit: u64) -> Result<Vec<LeaderboardEntry>, AppError> {
        UserAccountRepository::new(&self.state.db)
            .top_by_points(limit)
            .await
    }

    /// Balance and 1-based rank of a user. Unknown users have 0 points.
    pub async fn lookup(&self, user_id: u64) -> Result<Standing, AppError> {
        let accounts = UserAccountRepository::new(&self.state.db);
        let points = accounts
            .find(user_id)
            .await?
            .map(|account| account.points)
            .unwrap_or(0);
        let above = accounts.count_above(points).await?;

        Ok(Standing {
            points,
            rank: above + 1,
        })
    }

    /// Clears a user's active ticket binding.
    ///
    /// # Arguments
    /// - `ticket_name` - When set, only a binding to this ticket is cleared
    ///
    /// # Returns
    /// - `Ok(true)` - A binding was cleared
    /// - `Ok(false)` - Nothing matched
    pub async fn clear_active_ticket(
        &self,
        user_id: u64,
        ticket_name: Option<&str>,
    ) -> Result<bool, AppError> {
        let cleared = UserAccountRepository::new(&self.state.db)
            .clear_active_ticket(user_id, ticket_name)
            .await?;

        if cleared {
            tracing::info!("Cleared active ticket of {}", user_id);
        }

        Ok(cleared)
    }

    async fn log(&self, event: LogEvent) {
        if let Err(e) = self.state.notifier.log_event(event).await {
            tracing::error!("Failed to log ledger event: {}", e);
        }
    }

    async fn refresh_leaderboard(&self) {
        if let Err(e) = LeaderboardService::new(self.state).refresh().await {
            tracing::error!("Failed to refresh leaderboard: {}", e);
        }
    }
}

/// Timestamp id, suffixed when an archive with the same second already exists.
async fn unique_archive_id<C: sea_orm::ConnectionTrait>(
    archives: &PointsArchiveRepository<'_, C>,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let base = now.format(ARCHIVE_ID_FORMAT).to_string();
    if !archives.exists(&base).await? {
        return Ok(base);
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", base, suffix);
        if !archives.exists(&candidate).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
