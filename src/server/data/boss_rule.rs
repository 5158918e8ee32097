use migration::OnConflict;
use sea_orm::{
    sea_query::Expr, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::server::model::boss_rule::BossRule;

pub struct BossRuleRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BossRuleRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn all(&self) -> Result<Vec<BossRule>, DbErr> {
        Ok(entity::prelude::BossRule::find()
            .order_by_asc(entity::boss_rule::Column::Name)
            .all(self.db)
            .await?
            .into_iter()
            .map(BossRule::from_entity)
            .collect())
    }

    /// Inserts the rule or overwrites its points and room.
    pub async fn upsert(&self, rule: &BossRule) -> Result<(), DbErr> {
        entity::prelude::BossRule::insert(entity::boss_rule::ActiveModel {
            name: ActiveValue::Set(rule.name.clone()),
            points: ActiveValue::Set(rule.points),
            room: ActiveValue::Set(rule.room.clone()),
        })
        .on_conflict(
            OnConflict::column(entity::boss_rule::Column::Name)
                .update_columns([
                    entity::boss_rule::Column::Points,
                    entity::boss_rule::Column::Room,
                ])
                .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(())
    }

    /// Changes the points of an existing rule.
    ///
    /// # Returns
    /// - `Ok(true)` - Rule updated
    /// - `Ok(false)` - No rule with that name
    pub async fn set_points(&self, name: &str, points: i64) -> Result<bool, DbErr> {
        let result = entity::prelude::BossRule::update_many()
            .col_expr(entity::boss_rule::Column::Points, Expr::value(points))
            .filter(entity::boss_rule::Column::Name.eq(name))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Offers a boss under a ticket type. Attaching twice is a no-op.
    pub async fn attach(&self, ticket_type: &str, boss: &str) -> Result<(), DbErr> {
        entity::prelude::TicketTypeBoss::insert(entity::ticket_type_boss::ActiveModel {
            ticket_type: ActiveValue::Set(ticket_type.to_string()),
            boss: ActiveValue::Set(boss.to_string()),
        })
        .on_conflict(
            OnConflict::columns([
                entity::ticket_type_boss::Column::TicketType,
                entity::ticket_type_boss::Column::Boss,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(())
    }

    pub async fn detach(&self, ticket_type: &str, boss: &str) -> Result<bool, DbErr> {
        let result = entity::prelude::TicketTypeBoss::delete_many()
            .filter(entity::ticket_type_boss::Column::TicketType.eq(ticket_type))
            .filter(entity::ticket_type_boss::Column::Boss.eq(boss))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn bosses_for_type(&self, ticket_type: &str) -> Result<Vec<String>, DbErr> {
        Ok(entity::prelude::TicketTypeBoss::find()
            .filter(entity::ticket_type_boss::Column::TicketType.eq(ticket_type))
            .order_by_asc(entity::ticket_type_boss::Column::Boss)
            .all(self.db)
            .await?
            .into_iter()
            .map(|row| row.boss)
            .collect())
    }
}
