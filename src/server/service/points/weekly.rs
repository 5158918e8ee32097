use chrono::{DateTime, Utc};

use crate::server::util::time::week_start;

/// Result of applying the weekly requester cap to one bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyCap {
    /// New weekly counter, including the attempted bonus.
    pub weekly_points: i64,
    /// Start of the week the counter belongs to.
    pub week_start: DateTime<Utc>,
    /// Portion of the bonus that may be added to lifetime points.
    pub credited: i64,
}

/// Applies the weekly cap to a requester bonus.
///
/// The counter is reset when its marker is older than the current week. The credited amount
/// is limited to what remains under `cap`, while the counter always grows by the full
/// attempted bonus.
pub fn apply_weekly_cap(
    weekly_points: i64,
    marker: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cap: i64,
    attempted: i64,
) -> WeeklyCap {
    let current_week = week_start(now);
    let counted = match marker {
        Some(marker) if marker >= current_week => weekly_points,
        _ => 0,
    };

    let remaining = (cap - counted).max(0);
    let credited = attempted.max(0).min(remaining);

    WeeklyCap {
        weekly_points: counted + attempted.max(0),
        week_start: current_week,
        credited,
    }
}
