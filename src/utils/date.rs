use chrono::{DateTime, Utc};

pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Relative description of `value` as seen from `now`. Anything older than
/// thirty days falls back to the plain date.
pub fn relative_time(value: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = (*now - *value).num_seconds().max(0);

    match seconds {
        0..=59 => "just now".to_string(),
        60..=3_599 => plural(seconds / 60, "minute"),
        3_600..=86_399 => plural(seconds / 3_600, "hour"),
        86_400..=2_591_999 => plural(seconds / 86_400, "day"),
        _ => format_date(value),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 7).unwrap()
    }

    #[test]
    fn formats_fixed_patterns() {
        assert_eq!(format_date_time(&at()), "2025-03-01 09:05:07");
        assert_eq!(format_date(&at()), "2025-03-01");
    }

    #[test]
    fn relative_time_buckets() {
        let then = at();
        assert_eq!(relative_time(&then, &(then + Duration::seconds(30))), "just now");
        assert_eq!(relative_time(&then, &(then + Duration::minutes(1))), "1 minute ago");
        assert_eq!(relative_time(&then, &(then + Duration::minutes(5))), "5 minutes ago");
        assert_eq!(relative_time(&then, &(then + Duration::hours(3))), "3 hours ago");
        assert_eq!(relative_time(&then, &(then + Duration::days(2))), "2 days ago");
        assert_eq!(relative_time(&then, &(then + Duration::days(45))), "2025-03-01");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let then = at();
        assert_eq!(relative_time(&then, &(then - Duration::minutes(10))), "just now");
    }
}
