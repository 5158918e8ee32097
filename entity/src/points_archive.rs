use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "points_archive")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub reset_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::points_archive_entry::Entity")]
    PointsArchiveEntry,
}

impl Related<super::points_archive_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointsArchiveEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
