//! Timestamp utilities

use chrono::{DateTime, Months, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Step back a whole number of calendar months from `from`
///
/// Day-of-month is clamped to the end of the target month (Aug 31 minus six
/// months is Feb 28/29). Saturates at the earliest representable instant.
pub fn months_before(from: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    from.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_months_before_simple() {
        let from = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 12, 15, 12, 0, 0).unwrap();
        assert_eq!(months_before(from, 6), expected);
    }

    #[test]
    fn test_months_before_clamps_day_of_month() {
        let from = Utc.with_ymd_and_hms(2025, 8, 31, 0, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap();
        assert_eq!(months_before(from, 6), expected);
    }

    #[test]
    fn test_months_before_zero_is_identity() {
        let from = Utc.with_ymd_and_hms(2024, 12, 27, 8, 30, 0).unwrap();
        assert_eq!(months_before(from, 0), from);
    }
}
