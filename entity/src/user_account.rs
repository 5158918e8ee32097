use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub discord_id: String,
    pub username: Option<String>,
    pub points: i64,
    pub weekly_points: i64,
    pub weekly_reset_at: Option<DateTimeUtc>,
    pub tickets_claimed: i64,
    pub active_ticket: Option<String>,
    pub external_name: Option<String>,
    pub external_id: Option<String>,
    pub external_guild: Option<String>,
    pub previous_names: Json,
    pub verification_status: String,
    pub verified_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
