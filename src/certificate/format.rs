//! Date formatting for certificate text.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

/// Calendar date as month/day/year without padding (e.g. "1/15/2024").
pub fn format_calendar_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Date and time of day, e.g. "1/15/2024, 3:04:05 PM".
pub fn format_generated_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}, {}",
        format_calendar_date(at.date_naive()),
        at.format("%-I:%M:%S %p")
    )
}

/// Local wall-clock rendering of a Unix millisecond timestamp.
pub fn format_local_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(at) => format_generated_at(&at),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_calendar_date_is_unpadded() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_calendar_date(date), "1/5/2024");
    }

    #[test]
    fn test_generated_at_twelve_hour_clock() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 15, 4, 5).unwrap();
        assert_eq!(format_generated_at(&at), "2/1/2024, 3:04:05 PM");

        let morning = Utc.with_ymd_and_hms(2024, 12, 31, 0, 30, 0).unwrap();
        assert_eq!(format_generated_at(&morning), "12/31/2024, 12:30:00 AM");
    }
}
