use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Start of the ISO week containing `now`: Monday 00:00 UTC.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_monday = now.weekday().num_days_from_monday() as i64;
    let monday = now.date_naive() - Duration::days(days_since_monday);

    Utc.from_utc_datetime(&monday.and_time(chrono::NaiveTime::MIN))
}
