use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "points_archive_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub archive_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub discord_id: String,
    pub points: i64,
    pub tickets_claimed: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::points_archive::Entity",
        from = "Column::ArchiveId",
        to = "super::points_archive::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    PointsArchive,
}

impl Related<super::points_archive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointsArchive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
