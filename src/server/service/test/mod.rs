use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use chrono::{Duration, Utc};
use serenity::async_trait;
use test_utils::{builder::TestBuilder, context::TestContext, factory};
use uuid::Uuid;

use crate::server::{
    config::{RoleConfig, TicketPolicy},
    data::{ticket::TicketRepository, user_account::UserAccountRepository},
    error::{
        ledger::LedgerError, lookup::LookupError, platform::PlatformError, ticket::TicketError,
        AppError,
    },
    model::{
        account::LeaderboardEntry,
        log::LogEvent,
        ticket::{ChannelSpec, CreateTicketParams, MessageHandle, Ticket, TicketType},
        verification::ExternalProfile,
    },
    port::{GuildDirectory, Notifier, ProfileLookup},
    service::verification::RetryingLookup,
    state::AppState,
};

mod ticket;

pub const HELPER: u64 = 10;
pub const ADMIN: u64 = 11;
pub const SENIOR: u64 = 12;
pub const MEMBER: u64 = 13;
pub const OUTSIDER: u64 = 14;
pub const STRANGER: u64 = 15;

pub const HOME_GUILD: &str = "Oath";

/// Notifier that records every call instead of talking to Discord.
#[derive(Default)]
pub struct RecordingNotifier {
    next_id: AtomicU64,
    events: Mutex<Vec<LogEvent>>,
    messages: Mutex<Vec<(u64, String)>>,
    deleted: Mutex<Vec<u64>>,
    prompts: Mutex<Vec<(u64, Uuid, String)>>,
    disabled_prompts: Mutex<Vec<(MessageHandle, Uuid)>>,
    missing: Mutex<HashSet<u64>>,
    fail_channel_creation: AtomicBool,
    panels_rendered: AtomicUsize,
    panels_updated: AtomicUsize,
    leaderboard_updates: AtomicUsize,
}

impl RecordingNotifier {
    fn next(&self) -> u64 {
        700_000 + self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(u64, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.deleted.lock().unwrap().clone()
    }

    /// Gate prompts as `(channel, gate, content)`.
    pub fn prompts(&self) -> Vec<(u64, Uuid, String)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn disabled_prompts(&self) -> Vec<(MessageHandle, Uuid)> {
        self.disabled_prompts.lock().unwrap().clone()
    }

    /// Makes `channel_exists` report the channel as gone.
    pub fn remove_channel(&self, channel_id: u64) {
        self.missing.lock().unwrap().insert(channel_id);
    }

    pub fn fail_channel_creation(&self) {
        self.fail_channel_creation.store(true, Ordering::SeqCst);
    }

    pub fn panels_rendered(&self) -> usize {
        self.panels_rendered.load(Ordering::SeqCst)
    }

    pub fn panels_updated(&self) -> usize {
        self.panels_updated.load(Ordering::SeqCst)
    }

    pub fn leaderboard_updates(&self) -> usize {
        self.leaderboard_updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn create_ticket_channel(&self, _spec: &ChannelSpec) -> Result<u64, PlatformError> {
        if self.fail_channel_creation.load(Ordering::SeqCst) {
            return Err(PlatformError::Other("missing permissions".to_string()));
        }
        Ok(self.next())
    }

    async fn render_ticket_panel(&self, ticket: &Ticket) -> Result<MessageHandle, PlatformError> {
        let channel_id = ticket
            .channel_id
            .ok_or_else(|| PlatformError::Other("no channel".to_string()))?;
        self.panels_rendered.fetch_add(1, Ordering::SeqCst);
        Ok(MessageHandle {
            channel_id,
            message_id: self.next(),
        })
    }

    async fn update_ticket_panel(
        &self,
        handle: MessageHandle,
        _ticket: &Ticket,
    ) -> Result<(), PlatformError> {
        if self.missing.lock().unwrap().contains(&handle.channel_id) {
            return Err(PlatformError::ChannelMissing(handle.channel_id));
        }
        self.panels_updated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.messages
            .lock()
            .unwrap()
            .push((channel_id, content.to_string()));
        Ok(())
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError> {
        self.deleted.lock().unwrap().push(channel_id);
        self.missing.lock().unwrap().insert(channel_id);
        Ok(())
    }

    async fn channel_exists(&self, channel_id: u64) -> Result<bool, PlatformError> {
        Ok(!self.missing.lock().unwrap().contains(&channel_id))
    }

    async fn log_event(&self, event: LogEvent) -> Result<(), PlatformError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn update_leaderboard(&self, _entries: &[LeaderboardEntry]) -> Result<(), PlatformError> {
        self.leaderboard_updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn post_gate_prompt(
        &self,
        channel_id: u64,
        gate_id: Uuid,
        content: &str,
    ) -> Result<MessageHandle, PlatformError> {
        self.prompts
            .lock()
            .unwrap()
            .push((channel_id, gate_id, content.to_string()));
        Ok(MessageHandle {
            channel_id,
            message_id: self.next(),
        })
    }

    async fn disable_gate_prompt(
        &self,
        handle: MessageHandle,
        gate_id: Uuid,
    ) -> Result<(), PlatformError> {
        self.disabled_prompts.lock().unwrap().push((handle, gate_id));
        Ok(())
    }
}

/// Guild directory backed by an in-memory role map.
#[derive(Default)]
pub struct StaticGuildDirectory {
    roles: Mutex<HashMap<u64, HashSet<u64>>>,
}

impl StaticGuildDirectory {
    pub fn grant(&self, user_id: u64, role_id: u64) {
        self.roles
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .insert(role_id);
    }

    pub fn roles_of(&self, user_id: u64) -> HashSet<u64> {
        self.roles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl GuildDirectory for StaticGuildDirectory {
    async fn has_role(&self, user_id: u64, role_id: u64) -> Result<bool, PlatformError> {
        Ok(self.roles_of(user_id).contains(&role_id))
    }

    async fn role_members(&self, role_id: u64) -> Result<Vec<u64>, PlatformError> {
        let mut members: Vec<u64> = self
            .roles
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, roles)| roles.contains(&role_id))
            .map(|(&user_id, _)| user_id)
            .collect();
        members.sort_unstable();
        Ok(members)
    }

    async fn add_role(&self, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        self.grant(user_id, role_id);
        Ok(())
    }

    async fn remove_role(&self, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        if let Some(roles) = self.roles.lock().unwrap().get_mut(&user_id) {
            roles.remove(&role_id);
        }
        Ok(())
    }
}

type LookupResponse = Result<Option<ExternalProfile>, LookupError>;

/// Profile service that replays queued responses, then reports unknown names.
#[derive(Default)]
pub struct ScriptedProfileLookup {
    responses: Mutex<VecDeque<LookupResponse>>,
    calls: AtomicU32,
}

impl ScriptedProfileLookup {
    pub fn push(&self, response: LookupResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn found(&self, external_id: &str, guild: Option<&str>) {
        self.push(Ok(Some(ExternalProfile {
            external_id: external_id.to_string(),
            guild: guild.map(str::to_string),
        })));
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileLookup for Arc<ScriptedProfileLookup> {
    async fn fetch_profile(&self, _username: &str) -> LookupResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// Application state wired to in-memory fakes and a fresh SQLite database.
pub struct TestState {
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
    pub directory: Arc<StaticGuildDirectory>,
    pub lookup: Arc<ScriptedProfileLookup>,
    /// Keeps the in-memory database alive.
    _test: TestContext,
}

impl TestState {
    pub async fn new() -> Self {
        Self::with_policy(TicketPolicy::default()).await
    }

    pub async fn with_policy(policy: TicketPolicy) -> Self {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.clone().unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let directory = Arc::new(StaticGuildDirectory::default());
        let lookup = Arc::new(ScriptedProfileLookup::default());

        let state = AppState::new(
            db,
            notifier.clone(),
            directory.clone(),
            Arc::new(RetryingLookup::with_policy(
                lookup.clone(),
                3,
                std::time::Duration::ZERO,
            )),
            RoleConfig {
                helper: HELPER,
                admin: ADMIN,
                senior_helper: SENIOR,
                member: MEMBER,
                outsider: OUTSIDER,
                stranger: STRANGER,
            },
            policy,
            HOME_GUILD,
        );

        Self {
            state,
            notifier,
            directory,
            lookup,
            _test: test,
        }
    }

    pub fn db(&self) -> &sea_orm::DatabaseConnection {
        &self.state.db
    }

    /// Grants the helper role to each user.
    pub fn helpers(&self, user_ids: &[u64]) {
        for &user_id in user_ids {
            self.directory.grant(user_id, HELPER);
        }
    }

    pub async fn ticket(&self, name: &str) -> Ticket {
        TicketRepository::new(self.db())
            .find_by_name(name)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn points_of(&self, user_id: u64) -> i64 {
        UserAccountRepository::new(self.db())
            .find(user_id)
            .await
            .unwrap()
            .map(|account| account.points)
            .unwrap_or(0)
    }

    pub async fn active_ticket_of(&self, user_id: u64) -> Option<String> {
        UserAccountRepository::new(self.db())
            .find(user_id)
            .await
            .unwrap()
            .and_then(|account| account.active_ticket)
    }
}

/// Creation input for a preset ticket type.
pub fn standard_params(requester_id: u64, bosses: &[&str]) -> CreateTicketParams {
    CreateTicketParams {
        requester_id,
        ticket_type: TicketType::Standard("Daily 4 Man".to_string()),
        server: "Twilly".to_string(),
        room: "1234".to_string(),
        username: "Hero".to_string(),
        bosses: bosses.iter().map(|b| b.to_string()).collect(),
        max_claimers: None,
        total_kills: None,
    }
}
