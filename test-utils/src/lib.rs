//! Helpdesk Test Utils
//!
//! Shared testing utilities for the helpdesk ticket engine. Provides a builder for
//! in-memory SQLite test contexts and factories for seeding ticket, account and rule rows.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn claims_ticket() -> Result<(), TestError> {
//!     let test = TestBuilder::new().with_ticket_tables().build().await?;
//!     let db = test.db.unwrap();
//!     // Perform database operations...
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
