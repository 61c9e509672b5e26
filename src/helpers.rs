use chrono::{DateTime, Utc};

fn ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// "Last updated" text for a snapshot timestamp.
pub fn human_time(t: Option<DateTime<Utc>>) -> String {
    let Some(t) = t else {
        return "never".to_string();
    };

    let d = Utc::now() - t;
    let secs = d.num_seconds();

    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        ago(d.num_minutes(), "minute")
    } else if secs < 86400 {
        ago(d.num_hours(), "hour")
    } else if secs < 30 * 86400 {
        ago(d.num_days(), "day")
    } else {
        t.format("%b %e, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn human_time_buckets() {
        let now = Utc::now();
        assert_eq!(human_time(None), "never");
        assert_eq!(human_time(Some(now)), "just now");
        assert_eq!(human_time(Some(now - Duration::seconds(90))), "1 minute ago");
        assert_eq!(human_time(Some(now - Duration::minutes(5))), "5 minutes ago");
        assert_eq!(human_time(Some(now - Duration::hours(3))), "3 hours ago");
        assert_eq!(human_time(Some(now - Duration::days(2))), "2 days ago");
    }

    #[test]
    fn old_timestamps_show_a_date() {
        let t = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(human_time(Some(t)), "Mar  7, 2024");
    }
}
