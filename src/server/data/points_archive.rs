use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::server::{
    error::AppError,
    model::account::{LeaderboardEntry, PointsArchive},
};

pub struct PointsArchiveRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PointsArchiveRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn exists(&self, id: &str) -> Result<bool, DbErr> {
        Ok(entity::prelude::PointsArchive::find_by_id(id.to_string())
            .one(self.db)
            .await?
            .is_some())
    }

    /// Writes an archive header and one entry per user.
    pub async fn create(
        &self,
        id: &str,
        reset_by: u64,
        created_at: DateTime<Utc>,
        entries: &[LeaderboardEntry],
    ) -> Result<(), DbErr> {
        entity::points_archive::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            reset_by: ActiveValue::Set(reset_by.to_string()),
            created_at: ActiveValue::Set(created_at),
        }
        .insert(self.db)
        .await?;

        if entries.is_empty() {
            return Ok(());
        }

        let rows = entries
            .iter()
            .map(|entry| entity::points_archive_entry::ActiveModel {
                archive_id: ActiveValue::Set(id.to_string()),
                discord_id: ActiveValue::Set(entry.discord_id.to_string()),
                points: ActiveValue::Set(entry.points),
                tickets_claimed: ActiveValue::Set(entry.tickets_claimed),
            });

        entity::prelude::PointsArchiveEntry::insert_many(rows)
            .exec_without_returning(self.db)
            .await?;

        Ok(())
    }

    /// Reads an archive with its entries ordered by points, highest first.
    ///
    /// # Returns
    /// - `Ok(Some(PointsArchive))` - Archive found
    /// - `Ok(None)` - No archive with that id
    pub async fn find(&self, id: &str) -> Result<Option<PointsArchive>, AppError> {
        let Some(archive) = entity::prelude::PointsArchive::find_by_id(id.to_string())
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let entries = entity::prelude::PointsArchiveEntry::find()
            .filter(entity::points_archive_entry::Column::ArchiveId.eq(id))
            .order_by_desc(entity::points_archive_entry::Column::Points)
            .order_by_asc(entity::points_archive_entry::Column::DiscordId)
            .all(self.db)
            .await?;

        Ok(Some(PointsArchive::from_entity(archive, entries)?))
    }

    /// Archive ids, newest first.
    pub async fn list_ids(&self) -> Result<Vec<String>, DbErr> {
        Ok(entity::prelude::PointsArchive::find()
            .order_by_desc(entity::points_archive::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(|archive| archive.id)
            .collect())
    }
}
