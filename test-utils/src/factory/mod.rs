//! Factory methods for creating test data.
//!
//! Each entity has a `Factory` builder for customization and a `create_*` shorthand
//! for default creation.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let helper = factory::create_account(&db).await?;
//! let ticket = factory::ticket::TicketFactory::new(&db)
//!     .requester_id("42")
//!     .max_claimers(1)
//!     .build()
//!     .await?;
//! ```

pub mod boss_rule;
pub mod helpers;
pub mod ticket;
pub mod user_account;

pub use boss_rule::create_boss_rule;
pub use ticket::{create_claimer, create_ticket};
pub use user_account::create_account;
