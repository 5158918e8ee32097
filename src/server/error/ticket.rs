use thiserror::Error;

/// Reasons a ticket action is rejected.
///
/// Validation and authorization variants are resolved before any ledger write. The
/// `AlreadyLocked` and `AlreadyClosed` variants are the idempotency guards of the terminal
/// transitions and mean another caller got there first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("Ticket {0} was not found")]
    NotFound(String),

    #[error("Ticket {0} is already closed")]
    AlreadyClosed(String),

    /// Settlement of the ticket is in progress or done.
    #[error("Ticket {0} has already been completed")]
    AlreadyLocked(String),

    #[error("Ticket is full ({max} helpers)")]
    CapacityExceeded { max: u32 },

    #[error("You are already on ticket {active_ticket}")]
    AlreadyBusy { active_ticket: String },

    #[error("You cannot claim your own ticket")]
    SelfClaimForbidden,

    #[error("You are not allowed to do that")]
    Unauthorized,

    #[error("User {0} is not a claimer of this ticket")]
    NotAClaimer(u64),

    #[error("Helpers were pinged recently, try again in {remaining_secs}s")]
    Cooldown { remaining_secs: i64 },

    #[error("{0}")]
    InvalidInput(String),
}
