//! Boss point rule factory.

use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr};

/// Creates a point rule for a boss.
pub async fn create_boss_rule<C: ConnectionTrait>(
    db: &C,
    name: impl Into<String>,
    points: i64,
) -> Result<entity::boss_rule::Model, DbErr> {
    entity::boss_rule::ActiveModel {
        name: ActiveValue::Set(name.into()),
        points: ActiveValue::Set(points),
        room: ActiveValue::Set(String::new()),
    }
    .insert(db)
    .await
}

/// Offers a boss under a ticket type.
pub async fn create_type_boss<C: ConnectionTrait>(
    db: &C,
    ticket_type: impl Into<String>,
    boss: impl Into<String>,
) -> Result<entity::ticket_type_boss::Model, DbErr> {
    entity::ticket_type_boss::ActiveModel {
        ticket_type: ActiveValue::Set(ticket_type.into()),
        boss: ActiveValue::Set(boss.into()),
    }
    .insert(db)
    .await
}
