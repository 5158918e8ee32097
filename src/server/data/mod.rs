//! Database repository layer.
//!
//! Repositories wrap SeaORM queries for one aggregate each and convert entity models into
//! domain models at the boundary. They are generic over `ConnectionTrait` so the same
//! repository runs against the pooled connection or inside a transaction.

pub mod boss_rule;
pub mod points_archive;
pub mod sequence;
pub mod ticket;
pub mod user_account;
