//! Service layer for business logic and orchestration.
//!
//! Services sit between the bot handlers and scheduler on one side and the repositories and
//! collaborator ports on the other. They:
//!
//! - **Enforce rules**: validation, authorization and the ticket state machine
//! - **Orchestrate**: repository calls inside transactions, then chat-platform side effects
//! - **Work on domain models**: never on entity models or serenity types

pub mod confirmation;
pub mod expiry;
pub mod leaderboard;
pub mod points;
pub mod rules;
pub mod ticket;
pub mod verification;

#[cfg(test)]
mod test;
