use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketTypeBoss::Table)
                    .if_not_exists()
                    .col(string(TicketTypeBoss::TicketType))
                    .col(string(TicketTypeBoss::Boss))
                    .primary_key(
                        Index::create()
                            .col(TicketTypeBoss::TicketType)
                            .col(TicketTypeBoss::Boss),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketTypeBoss::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TicketTypeBoss {
    Table,
    TicketType,
    Boss,
}
