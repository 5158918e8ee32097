use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAccount::Table)
                    .if_not_exists()
                    .col(string(UserAccount::DiscordId).primary_key())
                    .col(string_null(UserAccount::Username))
                    .col(big_integer(UserAccount::Points).default(0))
                    .col(big_integer(UserAccount::WeeklyPoints).default(0))
                    .col(timestamp_with_time_zone_null(UserAccount::WeeklyResetAt))
                    .col(big_integer(UserAccount::TicketsClaimed).default(0))
                    .col(string_null(UserAccount::ActiveTicket))
                    .col(string_null(UserAccount::ExternalName))
                    .col(string_null(UserAccount::ExternalId))
                    .col(string_null(UserAccount::ExternalGuild))
                    .col(json(UserAccount::PreviousNames))
                    .col(string(UserAccount::VerificationStatus).default("unverified"))
                    .col(timestamp_with_time_zone_null(UserAccount::VerifiedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_account_points")
                    .table(UserAccount::Table)
                    .col(UserAccount::Points)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAccount::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserAccount {
    Table,
    DiscordId,
    Username,
    Points,
    WeeklyPoints,
    WeeklyResetAt,
    TicketsClaimed,
    ActiveTicket,
    ExternalName,
    ExternalId,
    ExternalGuild,
    PreviousNames,
    VerificationStatus,
    VerifiedAt,
}
