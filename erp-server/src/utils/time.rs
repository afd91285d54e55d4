//! Time helpers - business date handling
//!
//! Business dates (invoice dates, due dates, payment dates) are plain
//! calendar dates with no time component; timestamps elsewhere are Unix
//! millis UTC.

use chrono::{NaiveDate, Utc};

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Today's date (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let d = parse_date("2026-03-15").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());

        assert!(parse_date("15/03/2026").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_days_between() {
        let a = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        assert_eq!(days_between(a, b), 7);
        assert_eq!(days_between(b, a), -7);
    }
}
