use migration::OnConflict;
use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
};

/// Name of the counter ticket ids are drawn from.
pub const TICKET_SEQUENCE: &str = "ticket";

pub struct SequenceRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SequenceRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Atomically increments the named counter and returns the new value.
    ///
    /// The counter row is created on first use starting from 0, so the first value handed
    /// out is 1. The increment is a single `UPDATE value = value + 1`, never a read followed
    /// by a write, so concurrent callers inside their own transactions get distinct values.
    ///
    /// # Returns
    /// - `Ok(i64)` - Next value of the sequence
    /// - `Err(DbErr)` - Database error during insert, update or read back
    pub async fn next(&self, name: &str) -> Result<i64, DbErr> {
        entity::prelude::Sequence::insert(entity::sequence::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            value: ActiveValue::Set(0),
        })
        .on_conflict(
            OnConflict::column(entity::sequence::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        entity::prelude::Sequence::update_many()
            .col_expr(
                entity::sequence::Column::Value,
                Expr::col(entity::sequence::Column::Value).add(1),
            )
            .filter(entity::sequence::Column::Name.eq(name))
            .exec(self.db)
            .await?;

        let row = entity::prelude::Sequence::find_by_id(name.to_string())
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("sequence {}", name)))?;

        Ok(row.value)
    }

    /// Reads the current value without advancing it. Unused sequences read 0.
    #[cfg(test)]
    pub async fn current(&self, name: &str) -> Result<i64, DbErr> {
        let row = entity::prelude::Sequence::find_by_id(name.to_string())
            .one(self.db)
            .await?;

        Ok(row.map(|r| r.value).unwrap_or(0))
    }
}
