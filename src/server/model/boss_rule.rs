/// Points and room hint for one boss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossRule {
    pub name: String,
    pub points: i64,
    pub room: String,
}

impl BossRule {
    pub fn from_entity(entity: entity::boss_rule::Model) -> Self {
        Self {
            name: entity.name,
            points: entity.points,
            room: entity.room,
        }
    }
}

/// Parameters for attaching a boss to a ticket type.
#[derive(Debug, Clone)]
pub struct AddBossParams {
    pub ticket_type: String,
    pub boss: String,
    pub points: i64,
    pub room: String,
}
