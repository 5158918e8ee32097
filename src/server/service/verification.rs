//! Binding Discord users to their external game character.
//!
//! A user submits a character name, the profile service is asked for it, and the result is
//! stored on the account. The user's tier role is then recomputed: members of the home guild,
//! verified players elsewhere, and strangers who never verified. Role edits are cosmetic and
//! their failures are logged without failing the verification.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::Utc;
use serenity::async_trait;

use crate::server::{
    data::user_account::UserAccountRepository,
    error::{lookup::LookupError, verification::VerificationError, AppError},
    model::{
        account::UserAccount,
        log::LogEvent,
        verification::{
            ExternalProfile, GuildCount, RoleTier, VerificationOutcome, VerificationStatus,
        },
    },
    port::ProfileLookup,
    state::AppState,
};

/// Longest character name the game allows.
pub const MAX_NAME_LEN: usize = 25;

pub const LOOKUP_ATTEMPTS: u32 = 3;
pub const LOOKUP_RETRY_WAIT: Duration = Duration::from_secs(30);

/// Retries a lookup while the service reports rate limiting.
pub struct RetryingLookup<L> {
    inner: L,
    attempts: u32,
    wait: Duration,
}

impl<L: ProfileLookup> RetryingLookup<L> {
    pub fn new(inner: L) -> Self {
        Self::with_policy(inner, LOOKUP_ATTEMPTS, LOOKUP_RETRY_WAIT)
    }

    pub fn with_policy(inner: L, attempts: u32, wait: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            wait,
        }
    }
}

#[async_trait]
impl<L: ProfileLookup> ProfileLookup for RetryingLookup<L> {
    async fn fetch_profile(&self, username: &str) -> Result<Option<ExternalProfile>, LookupError> {
        for attempt in 1..=self.attempts {
            match self.inner.fetch_profile(username).await {
                Err(LookupError::RateLimited) => {
                    tracing::warn!(
                        "Profile lookup for {} rate limited (attempt {}/{})",
                        username,
                        attempt,
                        self.attempts
                    );
                    if attempt < self.attempts {
                        tokio::time::sleep(self.wait).await;
                    }
                }
                other => return other,
            }
        }

        Err(LookupError::Failed(format!(
            "still rate limited after {} attempts",
            self.attempts
        )))
    }
}

/// Users with a verification in flight.
#[derive(Clone, Default)]
pub struct PendingVerifications {
    users: Arc<Mutex<HashSet<u64>>>,
}

impl PendingVerifications {
    /// Marks the user pending. Returns `None` when a verification is already running.
    pub fn begin(&self, user_id: u64) -> Option<PendingGuard> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        if !users.insert(user_id) {
            return None;
        }

        Some(PendingGuard {
            users: self.users.clone(),
            user_id,
        })
    }

    pub fn is_pending(&self, user_id: u64) -> bool {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&user_id)
    }
}

/// Clears the pending mark when dropped.
pub struct PendingGuard {
    users: Arc<Mutex<HashSet<u64>>>,
    user_id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.user_id);
    }
}

/// Tier of a verified player, by in-game guild.
pub fn tier_for_guild(guild: Option<&str>, home_guild: &str) -> RoleTier {
    match guild {
        Some(guild) if guild.trim().eq_ignore_ascii_case(home_guild.trim()) => RoleTier::Member,
        _ => RoleTier::Outsider,
    }
}

/// Adds the previous name to the history unless it is the new name or already recorded.
pub fn archive_previous_name(
    history: &[String],
    previous: Option<&str>,
    new_name: &str,
) -> Vec<String> {
    let mut names = history.to_vec();
    if let Some(previous) = previous {
        let renamed = !previous.eq_ignore_ascii_case(new_name);
        let known = names.iter().any(|n| n.eq_ignore_ascii_case(previous));
        if renamed && !known {
            names.push(previous.to_string());
        }
    }

    names
}

pub struct VerificationService<'a> {
    state: &'a AppState,
}

impl<'a> VerificationService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Verifies a user against the external profile service.
    ///
    /// # Returns
    /// - `Ok(VerificationOutcome::Verified)` - Character bound and tier role applied
    /// - `Ok(VerificationOutcome::NotFound)` - No such character, account marked failed
    /// - `Err(AppError::VerificationErr(_))` - Bad name or a verification already running
    /// - `Err(AppError::LookupErr(_))` - Lookup failed after retries, nothing was changed
    pub async fn verify(
        &self,
        user_id: u64,
        username: &str,
    ) -> Result<VerificationOutcome, AppError> {
        let name = username.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(VerificationError::InvalidName { max: MAX_NAME_LEN }.into());
        }

        let _pending = self
            .state
            .pending_verifications
            .begin(user_id)
            .ok_or(VerificationError::AlreadyPending)?;

        let profile = self.state.lookup.fetch_profile(name).await?;
        let accounts = UserAccountRepository::new(&self.state.db);
        let account = accounts.find(user_id).await?;

        let Some(profile) = profile else {
            return self.mark_failed(user_id, name, account).await;
        };

        self.bind(user_id, name, profile, account.as_ref()).await
    }

    /// Binds a user to a character on an admin's word.
    ///
    /// The lookup still runs so the character id and guild are real, but the pending mark is
    /// skipped and a miss changes nothing on the account.
    ///
    /// # Returns
    /// - `Ok(VerificationOutcome::Verified)` - Character bound and tier role applied
    /// - `Ok(VerificationOutcome::NotFound)` - No such character, account untouched
    /// - `Err(AppError::VerificationErr(InvalidName))` - Bad name
    /// - `Err(AppError::LookupErr(_))` - Lookup failed after retries
    pub async fn force_verify(
        &self,
        admin_id: u64,
        user_id: u64,
        username: &str,
    ) -> Result<VerificationOutcome, AppError> {
        let name = username.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(VerificationError::InvalidName { max: MAX_NAME_LEN }.into());
        }

        let profile = self.state.lookup.fetch_profile(name).await?;
        let account = UserAccountRepository::new(&self.state.db).find(user_id).await?;

        let Some(profile) = profile else {
            tracing::info!("Admin {} could not force verify {} as {}", admin_id, user_id, name);
            let tier = match account {
                Some(a) if a.verification_status == VerificationStatus::Verified => {
                    tier_for_guild(a.external_guild.as_deref(), &self.state.home_guild_name)
                }
                _ => RoleTier::Stranger,
            };
            return Ok(VerificationOutcome::NotFound { tier });
        };

        tracing::info!("Admin {} force verifying {} as {}", admin_id, user_id, name);
        self.bind(user_id, name, profile, account.as_ref()).await
    }

    /// Stores the binding, applies the tier role and logs the verification.
    async fn bind(
        &self,
        user_id: u64,
        name: &str,
        profile: ExternalProfile,
        account: Option<&UserAccount>,
    ) -> Result<VerificationOutcome, AppError> {
        let previous_names = account
            .map(|a| {
                archive_previous_name(&a.previous_names, a.external_name.as_deref(), name)
            })
            .unwrap_or_default();
        let guild = profile.guild.filter(|g| !g.trim().is_empty());

        UserAccountRepository::new(&self.state.db)
            .bind_external(
                user_id,
                name,
                &profile.external_id,
                guild.as_deref(),
                &previous_names,
                Utc::now(),
            )
            .await?;

        let tier = tier_for_guild(guild.as_deref(), &self.state.home_guild_name);
        self.sync_roles(user_id, tier).await;

        tracing::info!(
            "{} verified as {} ({})",
            user_id,
            name,
            guild.as_deref().unwrap_or("no guild")
        );

        if let Err(e) = self
            .state
            .notifier
            .log_event(LogEvent::Verified {
                discord_id: user_id,
                external_name: name.to_string(),
                previous_names,
                guild: guild.clone(),
            })
            .await
        {
            tracing::error!("Failed to log verification of {}: {}", user_id, e);
        }

        Ok(VerificationOutcome::Verified {
            external_name: name.to_string(),
            guild,
            tier,
        })
    }

    /// A verified binding is kept when a later lookup misses; only unverified users become
    /// strangers.
    async fn mark_failed(
        &self,
        user_id: u64,
        name: &str,
        account: Option<UserAccount>,
    ) -> Result<VerificationOutcome, AppError> {
        let verified_before = account
            .as_ref()
            .is_some_and(|a| a.verification_status == VerificationStatus::Verified);

        if verified_before {
            let guild = account.and_then(|a| a.external_guild);
            let tier = tier_for_guild(guild.as_deref(), &self.state.home_guild_name);
            tracing::info!("{} looked up unknown name {}, keeping binding", user_id, name);
            return Ok(VerificationOutcome::NotFound { tier });
        }

        UserAccountRepository::new(&self.state.db)
            .set_verification_status(user_id, VerificationStatus::Failed)
            .await?;
        self.sync_roles(user_id, RoleTier::Stranger).await;

        tracing::info!("{} failed verification as {}", user_id, name);

        Ok(VerificationOutcome::NotFound {
            tier: RoleTier::Stranger,
        })
    }

    /// The user joined the home guild in game: force the member tier.
    pub async fn member_joined_home_guild(&self, user_id: u64) {
        tracing::info!("{} joined {}", user_id, self.state.home_guild_name);
        self.sync_roles(user_id, RoleTier::Member).await;
    }

    /// Verified accounts in an in-game guild.
    pub async fn guild_roster(&self, guild: &str) -> Result<Vec<UserAccount>, AppError> {
        UserAccountRepository::new(&self.state.db)
            .verified_in_guild(guild)
            .await
    }

    /// Verified account counts per in-game guild.
    pub async fn guild_counts(&self) -> Result<Vec<GuildCount>, AppError> {
        UserAccountRepository::new(&self.state.db)
            .verified_guild_counts()
            .await
    }

    /// Removes the other two tier roles and adds the resolved one.
    ///
    /// Each edit is attempted independently; failures are logged.
    pub async fn sync_roles(&self, user_id: u64, tier: RoleTier) {
        let roles = &self.state.roles;
        let (keep, remove) = match tier {
            RoleTier::Member => (roles.member, [roles.outsider, roles.stranger]),
            RoleTier::Outsider => (roles.outsider, [roles.member, roles.stranger]),
            RoleTier::Stranger => (roles.stranger, [roles.member, roles.outsider]),
        };

        let directory = &self.state.directory;
        for role_id in remove {
            if let Err(e) = directory.remove_role(user_id, role_id).await {
                tracing::error!("Failed to remove role {} from {}: {}", role_id, user_id, e);
            }
        }
        if let Err(e) = directory.add_role(user_id, keep).await {
            tracing::error!("Failed to add role {} to {}: {}", keep, user_id, e);
        }
    }
}
