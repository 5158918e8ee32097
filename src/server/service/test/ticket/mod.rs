use super::*;
use crate::server::{
    model::ticket::{ClaimResult, CompletionOutcome, TicketStatus},
    service::ticket::TicketService,
};
use test_utils::factory::{ticket::TicketFactory, user_account::UserAccountFactory};

mod cancel;
mod claim;
mod force;
mod maintenance;
mod settle;
