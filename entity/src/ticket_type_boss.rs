use sea_orm::entity::prelude::*;

/// Bosses offered for selection under a ticket type.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket_type_boss")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ticket_type: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub boss: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
