//! Domain models for the points ledger.

use chrono::{DateTime, Utc};

use crate::server::{
    error::{internal::InternalError, AppError},
    model::verification::VerificationStatus,
    util::parse::parse_u64_from_string,
};

/// Ledger record of one guild member.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub discord_id: u64,
    pub username: Option<String>,
    pub points: i64,
    pub weekly_points: i64,
    /// Start of the week `weekly_points` counts toward.
    pub weekly_reset_at: Option<DateTime<Utc>>,
    pub tickets_claimed: i64,
    pub active_ticket: Option<String>,
    pub external_name: Option<String>,
    pub external_id: Option<String>,
    pub external_guild: Option<String>,
    pub previous_names: Vec<String>,
    pub verification_status: VerificationStatus,
    pub verified_at: Option<DateTime<Utc>>,
}

impl UserAccount {
    pub fn from_entity(entity: entity::user_account::Model) -> Result<Self, AppError> {
        let previous_names: Vec<String> = serde_json::from_value(entity.previous_names)
            .map_err(|e| InternalError::MalformedColumn {
                column: "user_account.previous_names",
                reason: e.to_string(),
            })?;

        Ok(Self {
            discord_id: parse_u64_from_string(&entity.discord_id)?,
            username: entity.username,
            points: entity.points,
            weekly_points: entity.weekly_points,
            weekly_reset_at: entity.weekly_reset_at,
            tickets_claimed: entity.tickets_claimed,
            active_ticket: entity.active_ticket,
            external_name: entity.external_name,
            external_id: entity.external_id,
            external_guild: entity.external_guild,
            previous_names,
            verification_status: VerificationStatus::parse(&entity.verification_status)?,
            verified_at: entity.verified_at,
        })
    }
}

/// Who a bulk adjustment applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustTarget {
    Users(Vec<u64>),
    /// Every current holder of the role.
    Role(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub discord_id: u64,
    pub points: i64,
    pub tickets_claimed: i64,
}

/// Balance and 1-based leaderboard position of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub points: i64,
    pub rank: u64,
}

/// Snapshot taken right before a season reset.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsArchive {
    pub id: String,
    pub reset_by: u64,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
}

impl PointsArchive {
    pub fn from_entity(
        archive: entity::points_archive::Model,
        entries: Vec<entity::points_archive_entry::Model>,
    ) -> Result<Self, AppError> {
        let entries = entries
            .into_iter()
            .map(|entry| {
                Ok(LeaderboardEntry {
                    discord_id: parse_u64_from_string(&entry.discord_id)?,
                    points: entry.points,
                    tickets_claimed: entry.tickets_claimed,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self {
            reset_by: parse_u64_from_string(&archive.reset_by)?,
            id: archive.id,
            created_at: archive.created_at,
            entries,
        })
    }
}
