//! Audit events pushed to the ticket log channel.

use crate::server::model::ticket::{PointChange, RequesterBonus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    TicketCompleted {
        ticket_name: String,
        settled_by: u64,
        bosses: Vec<String>,
        helpers: Vec<PointChange>,
        requester: RequesterBonus,
    },
    TicketCancelled {
        ticket_name: String,
        cancelled_by: u64,
        claimers: Vec<u64>,
    },
    TicketAutoClosed {
        ticket_name: String,
        requester_id: u64,
        /// The backing channel was already gone when the sweep closed the ticket.
        orphaned: bool,
    },
    PointsAdjusted {
        actor: u64,
        delta: i64,
        changes: Vec<PointChange>,
    },
    PointsSet {
        actor: u64,
        change: PointChange,
    },
    PointsReset {
        actor: u64,
        archive_id: String,
        users: usize,
    },
    Verified {
        discord_id: u64,
        external_name: String,
        previous_names: Vec<String>,
        guild: Option<String>,
    },
}
