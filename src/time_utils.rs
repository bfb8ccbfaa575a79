// SPDX-License-Identifier: MIT

//! Shared helpers for calendar dates and timestamp formatting.
//!
//! Calendar dates are "YYYY-MM-DD" keys computed once, server-side, in UTC.
//! Streak and bucket logic compares these keys rather than wall-clock
//! instants, so a session never splits across a midnight boundary.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The calendar date a timestamp falls on (UTC).
pub fn calendar_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// The calendar date immediately before `date`.
///
/// Returns `None` if `date` is not a valid "YYYY-MM-DD" key.
pub fn previous_date(date: &str) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    Some((parsed - Duration::days(1)).format(DATE_FORMAT).to_string())
}

/// First calendar date of a lookback window of `days` ending at `today`.
///
/// The window is inclusive on both ends: sessions dated exactly `days`
/// calendar days back still match a `date >= window_start` filter.
pub fn window_start(today: DateTime<Utc>, days: u32) -> String {
    calendar_date(today - Duration::days(i64::from(days)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_calendar_date_is_date_only() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap();
        assert_eq!(calendar_date(at), "2024-01-15");
    }

    #[test]
    fn test_previous_date_crosses_month_boundary() {
        assert_eq!(previous_date("2024-03-01"), Some("2024-02-29".to_string()));
        assert_eq!(previous_date("2024-01-01"), Some("2023-12-31".to_string()));
    }

    #[test]
    fn test_previous_date_rejects_garbage() {
        assert_eq!(previous_date("not-a-date"), None);
    }

    #[test]
    fn test_window_start_includes_full_lookback() {
        let today = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        // A session dated exactly `days` back is still inside the window
        assert_eq!(window_start(today, 7), "2024-01-08");
        assert_eq!(window_start(today, 1), "2024-01-14");
    }
}
