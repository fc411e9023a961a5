//! Date helpers for the pt-BR screens.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::error::ParseError;

/// `dd/mm/yyyy`, followed by ` Às HH:MM:SS` when `show_time` is set.
pub fn format_date(date: &NaiveDateTime, show_time: bool) -> String {
    let day = date.format("%d/%m/%Y");
    if show_time {
        format!("{day} Às {}", date.format("%H:%M:%S"))
    } else {
        day.to_string()
    }
}

/// ISO date (`YYYY-MM-DD`) of `days` days before `now`, in UTC.
///
/// `None` when the result falls outside the representable date range.
pub fn calculate_date_back_from(now: DateTime<Utc>, days: i64) -> Option<String> {
    let date = now.checked_sub_signed(TimeDelta::try_days(days)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

pub fn calculate_date_back(days: i64) -> Option<String> {
    calculate_date_back_from(Utc::now(), days)
}

/// Midnight of the first day of `date`'s month.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDateTime {
    (date - Days::new(u64::from(date.day0()))).and_time(NaiveTime::MIN)
}

/// Midnight of the last day of `date`'s month.
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let first = date - Days::new(u64::from(date.day0()));
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(last.and_time(NaiveTime::MIN))
}

/// Calendar days from `a` to `b`; negative when `b` is earlier.
pub fn date_diff_in_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

fn field(value: &str, range: std::ops::Range<usize>, name: &'static str) -> Result<u32, ParseError> {
    let raw = value.get(range.clone()).ok_or(ParseError::TooShort {
        expected: range.end,
        found: value.len(),
    })?;
    raw.parse().map_err(|_| ParseError::InvalidField {
        field: name,
        value: raw.to_string(),
    })
}

fn build(
    (year, month, day): (u32, u32, u32),
    (hours, minutes, seconds): (u32, u32, u32),
) -> Result<NaiveDateTime, ParseError> {
    let year = i32::try_from(year).map_err(|_| ParseError::OutOfRange)?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hours, minutes, seconds))
        .ok_or(ParseError::OutOfRange)
}

/// Parses `dd/mm/yyyy HH:MM`.
///
/// Fields are read by position; separators are not checked.
pub fn parse_simple_date_and_time(value: &str) -> Result<NaiveDateTime, ParseError> {
    let day = field(value, 0..2, "day")?;
    let month = field(value, 3..5, "month")?;
    let year = field(value, 6..10, "year")?;
    let hours = field(value, 11..13, "hours")?;
    let minutes = field(value, 14..16, "minutes")?;
    build((year, month, day), (hours, minutes, 0))
}

/// Parses the compact `yyyymmddTHHMMSS` form.
pub fn parse_custom_string_to_date(value: &str) -> Result<NaiveDateTime, ParseError> {
    let year = field(value, 0..4, "year")?;
    let month = field(value, 4..6, "month")?;
    let day = field(value, 6..8, "day")?;
    let hours = field(value, 9..11, "hours")?;
    let minutes = field(value, 11..13, "minutes")?;
    let seconds = field(value, 13..15, "seconds")?;
    build((year, month, day), (hours, minutes, seconds))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_with_and_without_time() {
        let dt = date(2024, 3, 7).and_hms_opt(9, 5, 30).unwrap();
        assert_eq!(format_date(&dt, false), "07/03/2024");
        assert_eq!(format_date(&dt, true), "07/03/2024 Às 09:05:30");
    }

    #[test]
    fn date_back_crosses_months() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(calculate_date_back_from(now, 1).as_deref(), Some("2024-02-29"));
        assert_eq!(calculate_date_back_from(now, 0).as_deref(), Some("2024-03-01"));
        assert_eq!(calculate_date_back_from(now, -1).as_deref(), Some("2024-03-02"));
    }

    #[test]
    fn date_back_out_of_range_is_none() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(calculate_date_back_from(now, 200_000_000), None);
        assert_eq!(calculate_date_back_from(now, -200_000_000), None);
        assert_eq!(calculate_date_back_from(now, i64::MAX), None);
        assert_eq!(calculate_date_back_from(now, i64::MIN), None);
        assert_eq!(calculate_date_back_from(now, 365).as_deref(), Some("2023-03-02"));
    }

    #[test]
    fn month_bounds() {
        assert_eq!(first_day_of_month(date(2024, 2, 17)), date(2024, 2, 1).and_time(NaiveTime::MIN));
        assert_eq!(last_day_of_month(date(2024, 2, 17)), Some(date(2024, 2, 29).and_time(NaiveTime::MIN)));
        assert_eq!(last_day_of_month(date(2023, 12, 31)), Some(date(2023, 12, 31).and_time(NaiveTime::MIN)));
    }

    #[test]
    fn diff_in_days_is_signed() {
        assert_eq!(date_diff_in_days(date(2024, 1, 1), date(2024, 3, 1)), 60);
        assert_eq!(date_diff_in_days(date(2024, 3, 1), date(2024, 1, 1)), -60);
    }

    #[test]
    fn parses_simple_date_and_time() {
        let parsed = parse_simple_date_and_time("25/12/2023 18:45").unwrap();
        assert_eq!(parsed, date(2023, 12, 25).and_hms_opt(18, 45, 0).unwrap());
    }

    #[test]
    fn parses_compact_timestamp() {
        let parsed = parse_custom_string_to_date("20231225T184501").unwrap();
        assert_eq!(parsed, date(2023, 12, 25).and_hms_opt(18, 45, 1).unwrap());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_simple_date_and_time("25/12/2023"),
            Err(ParseError::TooShort { expected: 13, .. })
        ));
        assert!(matches!(
            parse_simple_date_and_time("aa/12/2023 18:45"),
            Err(ParseError::InvalidField { field: "day", .. })
        ));
        assert!(matches!(
            parse_custom_string_to_date("20231345T000000"),
            Err(ParseError::OutOfRange)
        ));
    }
}
