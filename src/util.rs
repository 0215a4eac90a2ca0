// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use crate::error::{ReportError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};
use std::io::{self, BufRead};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace and strips thousands separators like `","`.
/// - Accepts scientific notation (`1.5e2`).
/// - Returns `None` for blanks, missing-value markers (`NA`, `NaN`, `null`)
///   and non-finite results.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.replace(",", "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

/// Build a timestamp from the integer time parts of a row.
///
/// Returns `None` unless the parts form a real calendar date and an hour
/// in `0..=23`.
pub fn timestamp_from_parts(year: i32, month: u32, day: u32, hour: u32) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    Some(date.and_time(time))
}

/// Parse a user-supplied range bound.
///
/// A bare `YYYY-MM-DD` means midnight of that day. `YYYY-MM-DD HH:MM[:SS]`
/// and the `T`-separated form are accepted for hour-level bounds.
pub fn parse_bound(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

/// Resolve an optional user bound, falling back to `default` when it is
/// absent or blank.
pub fn resolve_bound(raw: Option<&str>, default: NaiveDateTime) -> Result<NaiveDateTime> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => parse_bound(s).ok_or_else(|| {
            ReportError::InvalidRange(format!(
                "could not parse date '{}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM",
                s
            ))
        }),
    }
}

/// Read one line and trim it. `Ok(None)` means the input is closed.
pub fn read_trimmed_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = String::new();
    match reader.read_line(&mut buf)? {
        0 => Ok(None),
        _ => Ok(Some(buf.trim().to_string())),
    }
}

pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    // `NaiveDate` supports subtraction; the result is a `Duration` in days.
    (later - earlier).num_days()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// `display_with` hook for table previews.
pub fn format_amount(n: &f64) -> String {
    format_number(*n, 2)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `420,768 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe_rejects_na_markers() {
        assert_eq!(parse_f64_safe(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("1,200")), Some(1200.0));
        assert_eq!(parse_f64_safe(Some("NA")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_timestamp_from_parts() {
        let ts = timestamp_from_parts(2013, 3, 1, 23).unwrap();
        assert_eq!(ts.to_string(), "2013-03-01 23:00:00");
        assert!(timestamp_from_parts(2013, 2, 30, 0).is_none());
        assert!(timestamp_from_parts(2013, 3, 1, 24).is_none());
    }

    #[test]
    fn test_parse_bound_formats() {
        let midnight = parse_bound("2017-02-28").unwrap();
        assert_eq!(midnight.to_string(), "2017-02-28 00:00:00");
        let hourly = parse_bound("2017-02-28 13:00").unwrap();
        assert_eq!(hourly.to_string(), "2017-02-28 13:00:00");
        assert_eq!(parse_bound("2017-02-28T13:00:00"), Some(hourly));
        assert!(parse_bound("28/02/2017").is_none());
        assert!(parse_bound("  ").is_none());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 1), "-1,500.0");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_int(420768usize), "420,768");
    }

    #[test]
    fn test_parse_f64_safe_accepts_scientific_notation() {
        assert_eq!(parse_f64_safe(Some("1.5e2")), Some(150.0));
        assert_eq!(parse_f64_safe(Some("2E3")), Some(2000.0));
        assert_eq!(parse_f64_safe(Some("-4.0e-1")), Some(-0.4));
    }

    #[test]
    fn test_resolve_bound() {
        let fallback = parse_bound("2013-03-01 00:00").unwrap();
        assert_eq!(resolve_bound(None, fallback).unwrap(), fallback);
        assert_eq!(resolve_bound(Some("   "), fallback).unwrap(), fallback);

        let end = resolve_bound(Some("2017-02-28"), fallback).unwrap();
        assert_eq!(end.to_string(), "2017-02-28 00:00:00");

        assert!(matches!(
            resolve_bound(Some("last tuesday"), fallback),
            Err(ReportError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_read_trimmed_line_reports_closed_input() {
        let mut input = io::Cursor::new("  2 \n\nY");
        assert_eq!(read_trimmed_line(&mut input).unwrap(), Some("2".to_string()));
        assert_eq!(read_trimmed_line(&mut input).unwrap(), Some(String::new()));
        assert_eq!(read_trimmed_line(&mut input).unwrap(), Some("Y".to_string()));
        assert_eq!(read_trimmed_line(&mut input).unwrap(), None);
    }
}
