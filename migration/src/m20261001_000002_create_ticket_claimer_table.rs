use sea_orm_migration::{prelude::*, schema::*};

use super::m20261001_000001_create_ticket_table::Ticket;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketClaimer::Table)
                    .if_not_exists()
                    .col(big_integer(TicketClaimer::TicketId))
                    .col(string(TicketClaimer::UserId))
                    .col(timestamp_with_time_zone(TicketClaimer::ClaimedAt))
                    .primary_key(
                        Index::create()
                            .col(TicketClaimer::TicketId)
                            .col(TicketClaimer::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_claimer_ticket_id")
                            .from(TicketClaimer::Table, TicketClaimer::TicketId)
                            .to(Ticket::Table, Ticket::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketClaimer::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TicketClaimer {
    Table,
    TicketId,
    UserId,
    ClaimedAt,
}
