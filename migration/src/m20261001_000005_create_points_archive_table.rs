use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PointsArchive::Table)
                    .if_not_exists()
                    .col(string(PointsArchive::Id).primary_key())
                    .col(string(PointsArchive::ResetBy))
                    .col(timestamp_with_time_zone(PointsArchive::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointsArchive::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PointsArchive {
    Table,
    Id,
    ResetBy,
    CreatedAt,
}
