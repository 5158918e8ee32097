use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub status: String,
    pub requester_id: String,
    pub ticket_type: String,
    pub server: String,
    pub room: String,
    pub username: String,
    pub bosses: Json,
    pub points: i64,
    pub max_claimers: i32,
    pub total_kills: Option<i32>,
    pub channel_id: Option<String>,
    pub message_id: Option<String>,
    pub reminder_sent: bool,
    pub last_helper_ping: Option<DateTimeUtc>,
    pub closed_by: Option<String>,
    pub closed_at: Option<DateTimeUtc>,
    pub auto_closed: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_claimer::Entity")]
    TicketClaimer,
}

impl Related<super::ticket_claimer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketClaimer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
