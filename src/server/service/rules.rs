//! Boss point rules and their cache.
//!
//! Points of a ticket are derived from per-boss rules stored in the database. Rules are read
//! on every ticket creation, so `PointRuleCache` keeps the loaded rule book in memory for a
//! bounded time. Every write made through `BossRuleService` invalidates it.

use std::{collections::HashMap, sync::Arc, time::Duration};

use sea_orm::ConnectionTrait;
use tokio::{sync::RwLock, time::Instant};

use crate::server::{
    data::boss_rule::BossRuleRepository,
    error::{ledger::LedgerError, AppError},
    model::boss_rule::{AddBossParams, BossRule},
    state::AppState,
};

/// Points a boss is worth when no rule matches it.
pub const DEFAULT_BOSS_POINTS: i64 = 1;

/// Default lifetime of a loaded rule book.
pub const DEFAULT_RULE_TTL: Duration = Duration::from_secs(300);

/// Snapshot of every boss rule, keyed by lowercase boss name.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: HashMap<String, BossRule>,
}

impl RuleBook {
    pub fn new(rules: Vec<BossRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| (rule.name.to_lowercase(), rule))
                .collect(),
        }
    }

    /// Finds the rule for a boss.
    ///
    /// An exact case-insensitive name match wins. Otherwise the longest rule name contained
    /// in the boss name is used, so "Ultra Warden (Hard)" falls back to "Ultra Warden".
    pub fn find(&self, boss: &str) -> Option<&BossRule> {
        let wanted = boss.trim().to_lowercase();

        if let Some(rule) = self.rules.get(&wanted) {
            return Some(rule);
        }

        self.rules
            .iter()
            .filter(|(name, _)| !name.is_empty() && wanted.contains(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, rule)| rule)
    }

    pub fn points_for(&self, boss: &str) -> i64 {
        self.find(boss)
            .map(|rule| rule.points)
            .unwrap_or(DEFAULT_BOSS_POINTS)
    }

    pub fn room_for(&self, boss: &str) -> Option<&str> {
        self.find(boss).map(|rule| rule.room.as_str())
    }
}

struct CachedRules {
    loaded_at: Instant,
    book: Arc<RuleBook>,
}

/// In-memory cache of the rule book with an explicit TTL and `invalidate`.
#[derive(Clone)]
pub struct PointRuleCache {
    inner: Arc<RwLock<Option<CachedRules>>>,
    ttl: Duration,
}

impl PointRuleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Returns the cached rule book, reloading it from the database when stale or empty.
    pub async fn get_or_load<C: ConnectionTrait>(&self, db: &C) -> Result<Arc<RuleBook>, AppError> {
        {
            let cached = self.inner.read().await;
            if let Some(cached) = cached.as_ref() {
                if cached.loaded_at.elapsed() < self.ttl {
                    return Ok(cached.book.clone());
                }
            }
        }

        let book = Arc::new(RuleBook::new(BossRuleRepository::new(db).all().await?));

        let mut cached = self.inner.write().await;
        *cached = Some(CachedRules {
            loaded_at: Instant::now(),
            book: book.clone(),
        });

        tracing::debug!("Loaded {} boss rules", book.rules.len());

        Ok(book)
    }

    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}

impl Default for PointRuleCache {
    fn default() -> Self {
        Self::new(DEFAULT_RULE_TTL)
    }
}

/// Administration of boss rules and the bosses offered per ticket type.
pub struct BossRuleService<'a> {
    state: &'a AppState,
}

impl<'a> BossRuleService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Creates or replaces a boss rule and offers the boss on a ticket type.
    pub async fn add_boss(&self, params: AddBossParams) -> Result<BossRule, AppError> {
        let name = params.boss.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput("Boss name must not be empty".to_string()).into());
        }
        if params.points < 0 {
            return Err(LedgerError::InvalidInput("Boss points must not be negative".to_string()).into());
        }
        if !params.room.chars().all(|c| c.is_ascii_digit()) {
            return Err(LedgerError::InvalidInput("Room must be numeric".to_string()).into());
        }

        let rule = BossRule {
            name: name.to_string(),
            points: params.points,
            room: params.room,
        };

        let repo = BossRuleRepository::new(&self.state.db);
        repo.upsert(&rule).await?;
        repo.attach(params.ticket_type.trim(), &rule.name).await?;
        self.state.rules.invalidate().await;

        tracing::info!(
            "Boss {} ({} points) added to {}",
            rule.name,
            rule.points,
            params.ticket_type
        );

        Ok(rule)
    }

    /// Stops offering a boss on a ticket type. The rule itself is kept.
    ///
    /// # Returns
    /// - `Ok(true)` - Boss was offered and is now removed
    /// - `Ok(false)` - Boss was not offered on that type
    pub async fn remove_boss(&self, ticket_type: &str, boss: &str) -> Result<bool, AppError> {
        let removed = BossRuleRepository::new(&self.state.db)
            .detach(ticket_type.trim(), boss.trim())
            .await?;
        self.state.rules.invalidate().await;

        Ok(removed)
    }

    /// Changes the points of an existing boss.
    ///
    /// # Returns
    /// - `Ok(())` - Points updated
    /// - `Err(AppError::LedgerErr(UnknownBoss))` - No rule for this boss
    pub async fn set_boss_points(&self, boss: &str, points: i64) -> Result<(), AppError> {
        if points < 0 {
            return Err(LedgerError::InvalidInput("Boss points must not be negative".to_string()).into());
        }

        let updated = BossRuleRepository::new(&self.state.db)
            .set_points(boss.trim(), points)
            .await?;
        if !updated {
            return Err(LedgerError::UnknownBoss(boss.trim().to_string()).into());
        }
        self.state.rules.invalidate().await;

        Ok(())
    }

    pub async fn bosses_for_type(&self, ticket_type: &str) -> Result<Vec<String>, AppError> {
        Ok(BossRuleRepository::new(&self.state.db)
            .bosses_for_type(ticket_type.trim())
            .await?)
    }

    /// Room number configured for a boss, if any.
    pub async fn room_for(&self, boss: &str) -> Result<Option<String>, AppError> {
        let book = self.state.rules.get_or_load(&self.state.db).await?;

        Ok(book.room_for(boss).map(str::to_string))
    }
}
