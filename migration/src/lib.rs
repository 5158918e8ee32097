pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_ticket_table;
mod m20261001_000002_create_ticket_claimer_table;
mod m20261001_000003_create_sequence_table;
mod m20261001_000004_create_user_account_table;
mod m20261001_000005_create_points_archive_table;
mod m20261001_000006_create_points_archive_entry_table;
mod m20261002_000007_create_boss_rule_table;
mod m20261002_000008_create_ticket_type_boss_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_ticket_table::Migration),
            Box::new(m20261001_000002_create_ticket_claimer_table::Migration),
            Box::new(m20261001_000003_create_sequence_table::Migration),
            Box::new(m20261001_000004_create_user_account_table::Migration),
            Box::new(m20261001_000005_create_points_archive_table::Migration),
            Box::new(m20261001_000006_create_points_archive_entry_table::Migration),
            Box::new(m20261002_000007_create_boss_rule_table::Migration),
            Box::new(m20261002_000008_create_ticket_type_boss_table::Migration),
        ]
    }
}
