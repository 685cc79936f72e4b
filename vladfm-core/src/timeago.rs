//! Compact relative time labels ("3h ago").

use chrono::{DateTime, Utc};

const INTERVALS: &[(&str, i64)] = &[
    ("y", 31_536_000),
    ("mo", 2_592_000),
    ("d", 86_400),
    ("h", 3_600),
    ("m", 60),
];

/// Formats the time elapsed from `then` to `now` using the largest whole
/// unit, or `just now` below one minute (including timestamps in the future).
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();

    for (label, unit) in INTERVALS {
        let count = seconds / unit;
        if count >= 1 {
            return format!("{count}{label} ago");
        }
    }
    "just now".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ago(delta: Duration) -> String {
        let now = Utc::now();
        time_ago(now - delta, now)
    }

    #[test]
    fn test_just_now() {
        assert_eq!(ago(Duration::seconds(59)), "just now");
        assert_eq!(ago(Duration::seconds(-30)), "just now");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(ago(Duration::seconds(60)), "1m ago");
        assert_eq!(ago(Duration::seconds(3_599)), "59m ago");
        assert_eq!(ago(Duration::hours(1)), "1h ago");
        assert_eq!(ago(Duration::days(2)), "2d ago");
        assert_eq!(ago(Duration::days(30)), "1mo ago");
        assert_eq!(ago(Duration::days(365)), "1y ago");
    }
}
