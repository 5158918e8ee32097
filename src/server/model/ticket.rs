//! Domain models for help tickets.
//!
//! A ticket moves through `open → completing → completed` when settled, or from `open`
//! straight to `cancelled` or `closed` (auto-expired). `TicketStatus::permits` is the table
//! of which actions each state accepts; the bot and the services consult it instead of
//! scattering status checks.

use chrono::{DateTime, Utc};

use crate::server::{
    error::{internal::InternalError, ticket::TicketError, AppError},
    util::parse::{parse_optional_u64, parse_u64_from_string},
};

/// Prefix of every ticket name, followed by the zero padded id.
pub const TICKET_NAME_PREFIX: &str = "ticket-";

/// Builds the storage key of a ticket from its sequential id.
pub fn ticket_name(id: i64) -> String {
    format!("{}{:03}", TICKET_NAME_PREFIX, id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    Open,
    /// Transient lock held while settlement writes the ledger.
    Completing,
    Completed,
    Cancelled,
    /// Auto-expired by the sweep.
    Closed,
}

/// Actions that can be attempted on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Claim,
    Complete,
    Cancel,
    RemoveClaimer,
    PingHelpers,
    AutoClose,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completing => "completing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, InternalError> {
        match value {
            "open" => Ok(Self::Open),
            "completing" => Ok(Self::Completing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "closed" => Ok(Self::Closed),
            other => Err(InternalError::UnknownVariant {
                kind: "ticket status",
                value: other.to_string(),
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Closed)
    }

    /// Checks whether `action` may run against a ticket in this state.
    ///
    /// Only open tickets accept actions. A ticket mid-settlement rejects everything with
    /// `AlreadyLocked`, as does a completed ticket asked to complete again.
    pub fn guard(&self, action: TicketAction, ticket_name: &str) -> Result<(), TicketError> {
        match (self, action) {
            (Self::Open, _) => Ok(()),
            (Self::Completing, _) | (Self::Completed, TicketAction::Complete) => {
                Err(TicketError::AlreadyLocked(ticket_name.to_string()))
            }
            (Self::Completed | Self::Cancelled | Self::Closed, _) => {
                Err(TicketError::AlreadyClosed(ticket_name.to_string()))
            }
        }
    }
}

/// Ticket categories offered on the creation panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TicketType {
    /// Farming a boss many times, rewarded from the kill-count tier table.
    Spamming,
    /// Trying out setups. Requesters earn nothing.
    Testing,
    OtherBosses,
    SevenManBosses,
    /// Preset boss lists such as daily or weekly bosses.
    Standard(String),
}

impl TicketType {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "spamming" => Self::Spamming,
            "testing" => Self::Testing,
            "other bosses" => Self::OtherBosses,
            "7-man bosses" | "7 man bosses" => Self::SevenManBosses,
            _ => Self::Standard(value.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Spamming => "spamming",
            Self::Testing => "testing",
            Self::OtherBosses => "other bosses",
            Self::SevenManBosses => "7-man bosses",
            Self::Standard(label) => label,
        }
    }

    /// Freeform types take a typed boss list and an explicit helper count.
    pub fn is_freeform(&self) -> bool {
        matches!(self, Self::Spamming | Self::Testing | Self::OtherBosses)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub name: String,
    pub status: TicketStatus,
    pub requester_id: u64,
    pub ticket_type: TicketType,
    pub server: String,
    pub room: String,
    pub username: String,
    pub bosses: Vec<String>,
    /// Base reward per helper, fixed at creation.
    pub points: i64,
    pub max_claimers: u32,
    /// Claimers in claim order. Never contains the requester.
    pub claimers: Vec<u64>,
    pub total_kills: Option<u32>,
    pub channel_id: Option<u64>,
    pub message_id: Option<u64>,
    pub reminder_sent: bool,
    pub last_helper_ping: Option<DateTime<Utc>>,
    pub closed_by: Option<u64>,
    pub closed_at: Option<DateTime<Utc>>,
    pub auto_closed: bool,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Converts the ticket row and its claimer rows at the repository boundary.
    ///
    /// # Returns
    /// - `Ok(Ticket)` - Converted domain model, claimers ordered by claim time
    /// - `Err(AppError::InternalErr)` - A stored id, status or boss list is malformed
    pub fn from_entity(
        entity: entity::ticket::Model,
        mut claimers: Vec<entity::ticket_claimer::Model>,
    ) -> Result<Self, AppError> {
        claimers.sort_by_key(|c| c.claimed_at);
        let claimers = claimers
            .iter()
            .map(|c| parse_u64_from_string(&c.user_id))
            .collect::<Result<Vec<_>, _>>()?;

        let bosses: Vec<String> =
            serde_json::from_value(entity.bosses).map_err(|e| InternalError::MalformedColumn {
                column: "ticket.bosses",
                reason: e.to_string(),
            })?;

        Ok(Self {
            id: entity.id,
            status: TicketStatus::parse(&entity.status)?,
            requester_id: parse_u64_from_string(&entity.requester_id)?,
            ticket_type: TicketType::parse(&entity.ticket_type),
            server: entity.server,
            room: entity.room,
            username: entity.username,
            bosses,
            points: entity.points,
            max_claimers: entity.max_claimers.max(0) as u32,
            claimers,
            total_kills: entity.total_kills.map(|k| k.max(0) as u32),
            channel_id: parse_optional_u64(entity.channel_id.as_deref())?,
            message_id: parse_optional_u64(entity.message_id.as_deref())?,
            reminder_sent: entity.reminder_sent,
            last_helper_ping: entity.last_helper_ping,
            closed_by: parse_optional_u64(entity.closed_by.as_deref())?,
            closed_at: entity.closed_at,
            auto_closed: entity.auto_closed,
            created_at: entity.created_at,
            name: entity.name,
        })
    }

    pub fn is_requester(&self, user_id: u64) -> bool {
        self.requester_id == user_id
    }

    pub fn is_claimer(&self, user_id: u64) -> bool {
        self.claimers.contains(&user_id)
    }

    pub fn is_full(&self) -> bool {
        self.claimers.len() as u32 >= self.max_claimers
    }

    /// Interactive panel location, if the panel was rendered.
    pub fn panel(&self) -> Option<MessageHandle> {
        match (self.channel_id, self.message_id) {
            (Some(channel_id), Some(message_id)) => Some(MessageHandle {
                channel_id,
                message_id,
            }),
            _ => None,
        }
    }
}

/// Location of a rendered message that can later be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Parameters for opening a ticket.
#[derive(Debug, Clone)]
pub struct CreateTicketParams {
    pub requester_id: u64,
    pub ticket_type: TicketType,
    pub server: String,
    pub room: String,
    /// In-game name of the requester.
    pub username: String,
    pub bosses: Vec<String>,
    /// Required for freeform types, ignored otherwise.
    pub max_claimers: Option<u32>,
    /// Required for spamming tickets.
    pub total_kills: Option<u32>,
}

/// Row values for a new ticket, computed by the lifecycle service.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub id: i64,
    pub requester_id: u64,
    pub ticket_type: TicketType,
    pub server: String,
    pub room: String,
    pub username: String,
    pub bosses: Vec<String>,
    pub points: i64,
    pub max_claimers: u32,
    pub total_kills: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Channel to materialize for a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub name: String,
    pub requester_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimResult {
    Claimed { claimers: usize, max_claimers: u32 },
    Unclaimed { claimers: usize, max_claimers: u32 },
}

/// Ledger movement for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointChange {
    pub user_id: u64,
    pub before: i64,
    pub after: i64,
}

/// Requester bonus after the weekly cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterBonus {
    pub user_id: u64,
    /// Bonus before the cap was applied.
    pub attempted: i64,
    /// Amount actually added to lifetime points.
    pub credited: i64,
    pub change: PointChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub ticket_name: String,
    pub settled_by: u64,
    pub helpers: Vec<PointChange>,
    pub requester: RequesterBonus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Fewer helpers than capacity, a human must confirm through the gate.
    ConfirmationRequired { gate_id: uuid::Uuid },
    Settled(SettlementReceipt),
}
