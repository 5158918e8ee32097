use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BossRule::Table)
                    .if_not_exists()
                    .col(string(BossRule::Name).primary_key())
                    .col(big_integer(BossRule::Points).default(1))
                    .col(string(BossRule::Room).default(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BossRule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BossRule {
    Table,
    Name,
    Points,
    Room,
}
