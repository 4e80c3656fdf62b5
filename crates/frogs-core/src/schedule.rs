use chrono::{DateTime, NaiveTime, TimeZone};

/// Default local time for the pending-tasks reminder.
pub fn default_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Next instant at which the local wall clock reads `at`.
///
/// Today if `now` is strictly before today's `at`, otherwise tomorrow. When
/// the wall-clock time does not exist on that day (DST gap) the following
/// day is tried; an ambiguous time resolves to its earliest instant.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    if now.naive_local() >= day.and_time(at) {
        day = day.succ_opt()?;
    }

    for _ in 0..2 {
        if let Some(instant) = tz.from_local_datetime(&day.and_time(at)).earliest() {
            return Some(instant);
        }
        day = day.succ_opt()?;
    }
    None
}
