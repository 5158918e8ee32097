use super::*;
use crate::server::{data::user_account::UserAccountRepository, model::verification::VerificationStatus};
use test_utils::factory::user_account::{create_account_with_points, UserAccountFactory};

mod active_ticket;
mod credit;
mod ranking;
mod verification;
