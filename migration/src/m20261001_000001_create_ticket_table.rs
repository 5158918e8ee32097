use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(big_integer(Ticket::Id).primary_key())
                    .col(string_uniq(Ticket::Name))
                    .col(string(Ticket::Status))
                    .col(string(Ticket::RequesterId))
                    .col(string(Ticket::TicketType))
                    .col(string(Ticket::Server))
                    .col(string(Ticket::Room))
                    .col(string(Ticket::Username))
                    .col(json(Ticket::Bosses))
                    .col(big_integer(Ticket::Points))
                    .col(integer(Ticket::MaxClaimers))
                    .col(integer_null(Ticket::TotalKills))
                    .col(string_null(Ticket::ChannelId))
                    .col(string_null(Ticket::MessageId))
                    .col(boolean(Ticket::ReminderSent).default(false))
                    .col(timestamp_with_time_zone_null(Ticket::LastHelperPing))
                    .col(string_null(Ticket::ClosedBy))
                    .col(timestamp_with_time_zone_null(Ticket::ClosedAt))
                    .col(boolean(Ticket::AutoClosed).default(false))
                    .col(timestamp_with_time_zone(Ticket::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_status")
                    .table(Ticket::Table)
                    .col(Ticket::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ticket {
    Table,
    Id,
    Name,
    Status,
    RequesterId,
    TicketType,
    Server,
    Room,
    Username,
    Bosses,
    Points,
    MaxClaimers,
    TotalKills,
    ChannelId,
    MessageId,
    ReminderSent,
    LastHelperPing,
    ClosedBy,
    ClosedAt,
    AutoClosed,
    CreatedAt,
}
