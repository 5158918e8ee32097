use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with customizable database schemas.
///
/// Add entity tables with `with_table()` or one of the grouped helpers, then call
/// `build()` to create an in-memory SQLite database containing them.
///
/// # Example
///
/// ```rust,ignore
/// let test = TestBuilder::new()
///     .with_table(UserAccount)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// CREATE TABLE statements executed in insertion order during `build()`.
    tables: Vec<TableCreateStatement>,
}

impl TestBuilder {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds an entity table to the test database schema.
    ///
    /// Tables with foreign keys must be added after the tables they reference.
    ///
    /// # Arguments
    /// - `entity` - SeaORM entity to create a table for
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds every table the ticket lifecycle touches.
    ///
    /// Covers tickets, claimers, the id sequence, user accounts and the point rule tables.
    pub fn with_ticket_tables(self) -> Self {
        self.with_table(Ticket)
            .with_table(TicketClaimer)
            .with_table(Sequence)
            .with_table(UserAccount)
            .with_table(BossRule)
            .with_table(TicketTypeBoss)
    }

    /// Adds the ledger tables including season archives.
    pub fn with_ledger_tables(self) -> Self {
        self.with_table(UserAccount)
            .with_table(PointsArchive)
            .with_table(PointsArchiveEntry)
    }

    /// Adds every table in the schema.
    pub fn with_all_tables(self) -> Self {
        self.with_ticket_tables()
            .with_table(PointsArchive)
            .with_table(PointsArchiveEntry)
    }

    /// Builds the test context and creates the configured tables.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Initialized context with tables ready
    /// - `Err(TestError::Database)` - Failed to connect or create tables
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new();

        setup.with_tables(self.tables).await?;

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
