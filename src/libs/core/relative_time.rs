use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;
const MINUTES_PER_WEEK: i64 = 7 * MINUTES_PER_DAY;

// %D is MM/DD/YY; the hour is 12-hour without an AM/PM marker
const ABSOLUTE_FORMAT: &str = "%D %I:%M";

/// Coarse "how long ago" label for `event` as seen at `now`.
///
/// Anything a week or older is printed as an absolute date in the event's timezone.
pub fn format_relative<Tz>(now: &DateTime<Tz>, event: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let diff_minutes = (now.timestamp() - event.timestamp()) / 60;

    if diff_minutes < 1 {
        "1 minute ago".to_string()
    } else if diff_minutes < MINUTES_PER_HOUR {
        format!("{} minutes ago", diff_minutes)
    } else if diff_minutes < 2 * MINUTES_PER_HOUR {
        "1 hour ago".to_string()
    } else if diff_minutes < MINUTES_PER_DAY {
        format!("{} hours ago", diff_minutes / MINUTES_PER_HOUR)
    } else if diff_minutes < 2 * MINUTES_PER_DAY {
        "1 day ago".to_string()
    } else if diff_minutes < MINUTES_PER_WEEK {
        format!("{} days ago", diff_minutes / MINUTES_PER_DAY)
    } else {
        event.format(ABSOLUTE_FORMAT).to_string()
    }
}
