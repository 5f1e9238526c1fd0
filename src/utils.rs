//! Utility functions for the rating engine

use chrono::{DateTime, NaiveTime, Utc};

/// Truncate a timestamp to midnight (UTC) of the same day
pub fn start_of_day(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Round a rating to the integer shown to players
pub fn display_round(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_start_of_day() {
        let t = Utc.with_ymd_and_hms(2021, 3, 1, 17, 45, 12).unwrap();
        let midnight = Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(start_of_day(t), midnight);
        assert_eq!(start_of_day(midnight), midnight);
    }

    #[test]
    fn test_display_round() {
        assert_eq!(display_round(1464.06), 1464);
        assert_eq!(display_round(1499.5), 1500);
        assert_eq!(display_round(-0.4), 0);
    }
}
