use sea_orm_migration::{prelude::*, schema::*};

use super::m20261001_000005_create_points_archive_table::PointsArchive;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PointsArchiveEntry::Table)
                    .if_not_exists()
                    .col(string(PointsArchiveEntry::ArchiveId))
                    .col(string(PointsArchiveEntry::DiscordId))
                    .col(big_integer(PointsArchiveEntry::Points))
                    .col(big_integer(PointsArchiveEntry::TicketsClaimed))
                    .primary_key(
                        Index::create()
                            .col(PointsArchiveEntry::ArchiveId)
                            .col(PointsArchiveEntry::DiscordId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_archive_entry_archive_id")
                            .from(PointsArchiveEntry::Table, PointsArchiveEntry::ArchiveId)
                            .to(PointsArchive::Table, PointsArchive::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointsArchiveEntry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PointsArchiveEntry {
    Table,
    ArchiveId,
    DiscordId,
    Points,
    TicketsClaimed,
}
