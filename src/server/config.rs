use chrono::Duration;
use std::str::FromStr;
use url::Url;

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_HOME_GUILD: &str = "Oath";
const DEFAULT_PROFILE_LOOKUP_URL: &str = "https://account.aq.com/CharPage";
const DEFAULT_WEEKLY_REQUESTER_CAP: i64 = 20;

pub struct Config {
    pub database_url: String,
    pub discord_bot_token: String,

    pub guild_id: u64,
    pub ticket_category_id: u64,
    pub ticket_log_channel_id: u64,
    pub leaderboard_channel_id: u64,

    pub roles: RoleConfig,
    pub policy: TicketPolicy,

    pub home_guild_name: String,
    /// Character page endpoint; the name is sent as its `id` query parameter.
    pub profile_lookup_url: Url,
}

/// Guild role ids the engine checks or assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    pub helper: u64,
    pub admin: u64,
    /// Senior helpers may complete tickets they did not request.
    pub senior_helper: u64,
    /// Verified members of the home guild.
    pub member: u64,
    /// Verified players outside the home guild.
    pub outsider: u64,
    /// Unverified or failed verification.
    pub stranger: u64,
}

/// Timing and capacity knobs of the ticket engine.
#[derive(Debug, Clone)]
pub struct TicketPolicy {
    pub weekly_requester_cap: i64,
    pub reminder_after: Duration,
    pub auto_close_after: Duration,
    pub confirmation_timeout: std::time::Duration,
    pub helper_ping_cooldown: Duration,
    pub default_capacity: u32,
    pub six_helper_capacity: u32,
    pub freeform_capacity: std::ops::RangeInclusive<u32>,
    /// When set, requesters holding an active ticket cannot open another one.
    pub requester_must_be_idle: bool,
}

impl Default for TicketPolicy {
    fn default() -> Self {
        Self {
            weekly_requester_cap: DEFAULT_WEEKLY_REQUESTER_CAP,
            reminder_after: Duration::minutes(30),
            auto_close_after: Duration::hours(6),
            confirmation_timeout: std::time::Duration::from_secs(30),
            helper_ping_cooldown: Duration::minutes(5),
            default_capacity: 3,
            six_helper_capacity: 6,
            freeform_capacity: 1..=20,
            requester_must_be_idle: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let policy = TicketPolicy {
            weekly_requester_cap: optional_var("WEEKLY_REQUESTER_CAP")?
                .unwrap_or(DEFAULT_WEEKLY_REQUESTER_CAP),
            requester_must_be_idle: optional_var("REQUESTER_MUST_BE_IDLE")?.unwrap_or(false),
            ..TicketPolicy::default()
        };

        Ok(Self {
            database_url: required_string("DATABASE_URL")?,
            discord_bot_token: required_string("DISCORD_BOT_TOKEN")?,
            guild_id: required_var("GUILD_ID")?,
            ticket_category_id: required_var("TICKET_CATEGORY_ID")?,
            ticket_log_channel_id: required_var("TICKET_LOG_CHANNEL_ID")?,
            leaderboard_channel_id: required_var("LEADERBOARD_CHANNEL_ID")?,
            roles: RoleConfig {
                helper: required_var("HELPER_ROLE_ID")?,
                admin: required_var("ADMIN_ROLE_ID")?,
                senior_helper: required_var("SENIOR_HELPER_ROLE_ID")?,
                member: required_var("MEMBER_ROLE_ID")?,
                outsider: required_var("OUTSIDER_ROLE_ID")?,
                stranger: required_var("STRANGER_ROLE_ID")?,
            },
            policy,
            home_guild_name: std::env::var("HOME_GUILD_NAME")
                .unwrap_or_else(|_| DEFAULT_HOME_GUILD.to_string()),
            profile_lookup_url: match optional_var("PROFILE_LOOKUP_URL")? {
                Some(url) => url,
                None => parse_var("PROFILE_LOOKUP_URL", DEFAULT_PROFILE_LOOKUP_URL)?,
            },
        })
    }
}

fn required_string(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn required_var<T>(name: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_var(name, &required_string(name)?)
}

fn optional_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .ok()
        .map(|raw| parse_var(name, &raw))
        .transpose()
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            reason: e.to_string(),
        })
}
