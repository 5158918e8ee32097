//! Error types and user-facing message mapping.
//!
//! `AppError` is the top-level error that wraps the domain errors of the ticket engine and
//! the infrastructure errors of the database, Discord and HTTP layers. Interaction handlers
//! turn any `AppError` into an ephemeral reply through `AppError::user_message`.

pub mod config;
pub mod gate;
pub mod internal;
pub mod ledger;
pub mod lookup;
pub mod platform;
pub mod ticket;
pub mod verification;

use thiserror::Error;

use crate::server::error::{
    config::ConfigError, gate::GateError, internal::InternalError, ledger::LedgerError,
    lookup::LookupError, platform::PlatformError, ticket::TicketError,
    verification::VerificationError,
};

/// Top-level application error type.
///
/// Domain variants carry their own user-facing text. Infrastructure variants are logged in
/// full and reported to the user with a generic message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Ticket lifecycle rejected the action.
    #[error(transparent)]
    TicketErr(#[from] TicketError),

    /// Points ledger rejected the operation.
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),

    /// Confirmation gate could not be resolved.
    #[error(transparent)]
    GateErr(#[from] GateError),

    /// External profile lookup failed after retries.
    #[error(transparent)]
    LookupErr(#[from] LookupError),

    /// Verification request rejected before the lookup ran.
    #[error(transparent)]
    VerificationErr(#[from] VerificationError),

    /// Chat platform collaborator failed.
    #[error(transparent)]
    PlatformErr(#[from] PlatformError),

    /// Unexpected state indicating a bug or corrupted record.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// HTTP client request error from reqwest.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Boxes serenity errors to keep `AppError` small.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Text shown to the user in an ephemeral reply.
    ///
    /// Domain errors describe what went wrong. Everything else is logged with full details
    /// and replaced by a generic message so internals never leak into the guild.
    pub fn user_message(&self) -> String {
        match self {
            Self::TicketErr(err) => format!("❌ {}", err),
            Self::LedgerErr(err) => format!("❌ {}", err),
            Self::GateErr(err) => format!("⚠️ {}", err),
            Self::VerificationErr(err) => format!("❌ {}", err),
            Self::LookupErr(err) => format!("❌ {}", err),
            err => {
                tracing::error!("{}", err);
                "❌ Something went wrong, please try again later.".to_string()
            }
        }
    }

    /// Whether the error is an expected "someone else already did this" outcome.
    pub fn is_idempotency_guard(&self) -> bool {
        matches!(
            self,
            Self::TicketErr(TicketError::AlreadyLocked(_))
                | Self::TicketErr(TicketError::AlreadyClosed(_))
                | Self::GateErr(GateError::AlreadyResolved)
        )
    }
}
