//! Wire date parsing and calendar bounds.
//!
//! Dates arrive either as RFC 3339 timestamps or as plain `YYYY-MM-DD`
//! calendar dates, which are read as UTC midnight.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SubsecRound, TimeZone, Utc};

use crate::error::{PharmacyError, PharmacyResult};

pub fn parse_date(raw: &str) -> PharmacyResult<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| PharmacyError::InvalidDate(raw.to_string()))
}

pub fn parse_optional_date(raw: Option<&str>) -> PharmacyResult<Option<DateTime<Utc>>> {
    raw.map(parse_date).transpose()
}

/// 00:00:00.000 of the same UTC day
pub fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// 23:59:59.999 of the same UTC day; millisecond precision matches what the store keeps
pub fn end_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(ts) + Duration::days(1) - Duration::milliseconds(1)
}

/// Inclusive bounds of a calendar year
pub fn year_bounds(year: i32) -> PharmacyResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = first_instant(year, 1)?;
    let next = first_instant(year + 1, 1)?;
    Ok((start, next - Duration::milliseconds(1)))
}

/// Inclusive bounds of a calendar month
pub fn month_bounds(year: i32, month: u32) -> PharmacyResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = first_instant(year, month)?;
    let next = if month == 12 {
        first_instant(year + 1, 1)?
    } else {
        first_instant(year, month + 1)?
    };
    Ok((start, next - Duration::milliseconds(1)))
}

fn first_instant(year: i32, month: u32) -> PharmacyResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| PharmacyError::InvalidDate(format!("{:04}-{:02}", year, month)))
}

/// Current time truncated to milliseconds, the precision BSON dates keep
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A fresh `updated_at` that is strictly later than `previous`
pub fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + Duration::milliseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date_is_utc_midnight() {
        let ts = parse_date("2025-03-14").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-14T00:00:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        let ts = parse_date("2025-03-14T10:30:00-03:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-14T13:30:00+00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_date("14/03/2025"),
            Err(PharmacyError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_date("2025-02-30"),
            Err(PharmacyError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_optional_date() {
        assert!(parse_optional_date(None).unwrap().is_none());
        assert!(parse_optional_date(Some("2025-01-01")).unwrap().is_some());
        assert!(parse_optional_date(Some("soon")).is_err());
    }

    #[test]
    fn test_day_bounds() {
        let ts = parse_date("2025-06-10T15:45:12Z").unwrap();
        assert_eq!(start_of_day(ts).to_rfc3339(), "2025-06-10T00:00:00+00:00");
        assert_eq!(
            end_of_day(ts).to_rfc3339(),
            "2025-06-10T23:59:59.999+00:00"
        );
    }

    #[test]
    fn test_month_bounds_handle_december_and_leap_years() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-12-31T23:59:59.999+00:00");

        let (_, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(end.to_rfc3339(), "2024-02-29T23:59:59.999+00:00");

        assert!(month_bounds(2024, 13).is_err());
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2026).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-12-31T23:59:59.999+00:00");
    }

    #[test]
    fn test_next_update_time_is_strictly_later() {
        let future = now() + Duration::seconds(5);
        assert!(next_update_time(future) > future);

        let past = now() - Duration::seconds(5);
        assert!(next_update_time(past) > past);
    }
}
