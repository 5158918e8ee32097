use super::*;
use crate::server::{data::boss_rule::BossRuleRepository, model::boss_rule::BossRule};
