//! Calendar-day normalisation.
//!
//! Rule windows and queries are compared as whole days. Everything here works
//! on `Copy` values and returns new ones; nothing is adjusted in place.

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

/// Drops the time of day, keeping the calendar date in the value's own offset.
pub fn to_calendar_day(moment: OffsetDateTime) -> Date {
    moment.date()
}

/// Parses a date or timestamp into its calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, and the date part of
/// `YYYY-MM-DD HH:MM:SS...` strings as Postgres prints them. Returns `None` for
/// anything else; callers treat that as a bound that never matches.
pub fn parse_calendar_day(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let day_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(trimmed, &day_only) {
        return Some(date);
    }

    if let Ok(moment) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(to_calendar_day(moment));
    }

    // Timestamp text without an RFC 3339 offset, e.g. "2026-06-01 14:00:00+00".
    let (day, rest) = trimmed.split_at_checked(10)?;
    let mut rest = rest.chars();
    let separator = rest.next()?;
    let hour_digit = rest.next()?;
    if !matches!(separator, 'T' | ' ') || !hour_digit.is_ascii_digit() {
        return None;
    }
    Date::parse(day, &day_only).ok()
}

/// Whole days from `start` to `end`; negative when `end` precedes `start`.
pub fn days_between(start: Date, end: Date) -> i64 {
    (end - start).whole_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn strips_time_of_day() {
        let moment = datetime!(2026-07-04 23:59:59 +02:00);
        assert_eq!(to_calendar_day(moment), date!(2026 - 07 - 04));
    }

    #[test]
    fn keeps_caller_value_untouched() {
        let moment = datetime!(2026-07-04 18:30 UTC);
        let _ = to_calendar_day(moment);
        assert_eq!(moment.hour(), 18);
    }

    #[test]
    fn parses_plain_dates() {
        assert_eq!(parse_calendar_day("2026-12-24"), Some(date!(2026 - 12 - 24)));
        assert_eq!(parse_calendar_day("  2026-01-02 "), Some(date!(2026 - 01 - 02)));
    }

    #[test]
    fn parses_rfc3339_in_its_own_offset() {
        assert_eq!(
            parse_calendar_day("2026-06-01T23:30:00-05:00"),
            Some(date!(2026 - 06 - 01))
        );
        assert_eq!(
            parse_calendar_day("2026-06-01T00:00:00Z"),
            Some(date!(2026 - 06 - 01))
        );
    }

    #[test]
    fn parses_postgres_timestamp_text() {
        assert_eq!(
            parse_calendar_day("2026-06-01 14:00:00+00"),
            Some(date!(2026 - 06 - 01))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_calendar_day(""), None);
        assert_eq!(parse_calendar_day("not a date"), None);
        assert_eq!(parse_calendar_day("2026-02-30"), None);
        assert_eq!(parse_calendar_day("2026-06-01Xyz"), None);
        assert_eq!(parse_calendar_day("06/01/2026"), None);
    }

    #[test]
    fn counts_days() {
        assert_eq!(days_between(date!(2026 - 03 - 01), date!(2026 - 03 - 04)), 3);
        assert_eq!(days_between(date!(2026 - 03 - 04), date!(2026 - 03 - 01)), -3);
    }
}
