//! Point and capacity rules applied when a ticket is opened or settled.

use crate::server::{
    config::TicketPolicy,
    error::ticket::TicketError,
    model::ticket::TicketType,
    service::rules::RuleBook,
};

/// Bosses that share one daily reward when several of them are run together.
pub const LEGION_BOSSES: [&str; 3] = ["The Beast", "Deimos", "Legion Lich Lord"];

/// Rule name of the combined legion reward.
pub const LEGION_DAILY_RULE: &str = "Legion Daily";

/// Bosses whose tickets allow six helpers, matched as substrings.
pub const SIX_HELPER_BOSSES: [&str; 9] = [
    "Astral Shrine",
    "Grim Challenge",
    "Apex Azalith",
    "The Beast",
    "Void Trio",
    "Lich King",
    "Deimos",
    "Azalith",
    "Kathool Depths",
];

/// Ascending kill thresholds of spamming tickets.
pub const SPAMMING_KILL_TIERS: [u32; 10] = [15, 30, 50, 75, 105, 145, 190, 240, 295, 300];

/// Largest kill count a spamming ticket accepts.
pub const MAX_TOTAL_KILLS: u32 = 100_000;

/// Points per helper for a spamming ticket.
///
/// Worth one point per threshold strictly below `kills`, at least one. 205 kills clears
/// every threshold up to 190 and pays 7; anything above the last threshold pays 10.
pub fn spamming_points(kills: u32) -> Result<i64, TicketError> {
    if kills == 0 {
        return Err(TicketError::InvalidInput(
            "Total kills must be at least 1".to_string(),
        ));
    }

    let cleared = SPAMMING_KILL_TIERS.partition_point(|&threshold| threshold < kills);

    Ok(cleared.max(1) as i64)
}

fn is_legion_boss(boss: &str) -> bool {
    LEGION_BOSSES
        .iter()
        .any(|legion| legion.eq_ignore_ascii_case(boss.trim()))
}

/// Sums boss rules, collapsing several legion bosses into one legion daily reward.
pub fn boss_points(bosses: &[String], rules: &RuleBook) -> i64 {
    let (legion, others): (Vec<&String>, Vec<&String>) =
        bosses.iter().partition(|boss| is_legion_boss(boss));

    let mut points: i64 = others.iter().map(|boss| rules.points_for(boss)).sum();

    match legion.as_slice() {
        [] => {}
        [single] => points += rules.points_for(single),
        _ => points += rules.points_for(LEGION_DAILY_RULE),
    }

    points
}

/// Points every helper earns on settlement, fixed when the ticket is opened.
pub fn ticket_points(
    ticket_type: &TicketType,
    bosses: &[String],
    total_kills: Option<u32>,
    rules: &RuleBook,
) -> Result<i64, TicketError> {
    match ticket_type {
        TicketType::Spamming => {
            let kills = total_kills.ok_or_else(|| {
                TicketError::InvalidInput("Spamming tickets need a total kill count".to_string())
            })?;
            spamming_points(kills)
        }
        TicketType::Testing | TicketType::OtherBosses => Ok(bosses.len() as i64),
        TicketType::SevenManBosses | TicketType::Standard(_) => Ok(boss_points(bosses, rules)),
    }
}

/// Helper slots of a ticket.
///
/// Freeform types take the requested count within the policy bounds. Preset types get the
/// six-helper capacity when any boss matches the six-helper list.
pub fn capacity(
    ticket_type: &TicketType,
    bosses: &[String],
    requested: Option<u32>,
    policy: &TicketPolicy,
) -> Result<u32, TicketError> {
    if ticket_type.is_freeform() {
        let requested = requested.ok_or_else(|| {
            TicketError::InvalidInput("Number of helpers is required".to_string())
        })?;
        if !policy.freeform_capacity.contains(&requested) {
            return Err(TicketError::InvalidInput(format!(
                "Number of helpers must be between {} and {}",
                policy.freeform_capacity.start(),
                policy.freeform_capacity.end()
            )));
        }
        return Ok(requested);
    }

    let lowered: Vec<String> = bosses.iter().map(|boss| boss.to_lowercase()).collect();
    let six_helpers = SIX_HELPER_BOSSES.iter().any(|six| {
        let six = six.to_lowercase();
        lowered.iter().any(|boss| boss.contains(&six))
    });

    Ok(if six_helpers {
        policy.six_helper_capacity
    } else {
        policy.default_capacity
    })
}

/// Requester bonus before the weekly cap.
pub fn requester_reward(ticket_type: &TicketType, points: i64, boss_count: usize) -> i64 {
    match ticket_type {
        TicketType::Testing => 0,
        TicketType::Spamming => (points / 2).max(1),
        TicketType::SevenManBosses | TicketType::OtherBosses | TicketType::Standard(_) => {
            boss_count as i64
        }
    }
}
