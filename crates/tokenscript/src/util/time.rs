//! GeneralizedTime parsing and RFC 3339 formatting.
//!
//! Time attributes arrive either as GeneralizedTime text
//! (`YYYYMMDDHH[MM[SS[.fff]]][Z|+HHMM|-HHMM]`, X.680) or as Unix seconds.
//! Both are rendered as RFC 3339.

use thiserror::Error;

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;
const MICROSECONDS_PER_DAY: i64 = 24 * MICROSECONDS_PER_HOUR;

/// Error type for GeneralizedTime parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TimeParseError {
    pub message: String,
}

impl TimeParseError {
    fn new(text: &str) -> Self {
        Self {
            message: format!("Invalid GeneralizedTime: {}", text),
        }
    }
}

/// A point in time with the offset it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneralizedTime {
    /// Microseconds since the Unix epoch, UTC.
    pub epoch_micros: i64,
    /// Offset of the original wall time from UTC, in minutes.
    pub offset_min: i16,
}

impl GeneralizedTime {
    /// Parses GeneralizedTime text. A missing zone designator means UTC.
    pub fn parse(text: &str) -> Result<Self, TimeParseError> {
        let text = text.trim();
        let err = || TimeParseError::new(text);

        let digits_end = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let digits = &text[..digits_end];
        if !matches!(digits.len(), 10 | 12 | 14) {
            return Err(err());
        }

        let field = |range: std::ops::Range<usize>| -> Result<u32, TimeParseError> {
            digits.get(range).map_or(Ok(0), |s| s.parse().map_err(|_| err()))
        };
        let year = field(0..4)? as i32;
        let month = field(4..6)?;
        let day = field(6..8)?;
        let hour = field(8..10)?;
        let minute = field(10..12)?;
        let second = field(12..14)?;

        if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
            return Err(err());
        }
        if hour > 23 || minute > 59 || second > 60 {
            return Err(err());
        }

        let mut rest = &text[digits_end..];
        let mut micros = 0;
        if let Some(frac) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(',')) {
            let frac_end = frac.find(|c: char| !c.is_ascii_digit()).unwrap_or(frac.len());
            if frac_end == 0 || digits.len() != 14 {
                return Err(err());
            }
            micros = parse_fractional_seconds(&frac[..frac_end]);
            rest = &frac[frac_end..];
        }
        let offset_min = parse_timezone_offset(rest).ok_or_else(err)?;

        let days = date_to_days(year, month, day) as i64;
        let local_micros = days * MICROSECONDS_PER_DAY
            + hour as i64 * MICROSECONDS_PER_HOUR
            + minute as i64 * MICROSECONDS_PER_MINUTE
            + second as i64 * MICROSECONDS_PER_SECOND
            + micros;

        Ok(Self {
            epoch_micros: local_micros - offset_min as i64 * MICROSECONDS_PER_MINUTE,
            offset_min,
        })
    }

    /// Formats as RFC 3339, keeping the original offset.
    pub fn to_rfc3339(&self) -> String {
        format_datetime_rfc3339(self.epoch_micros, self.offset_min)
    }
}

/// Parses a zone designator (empty, `Z`, `+HHMM`, `-HHMM`, `+HH`) into
/// minutes east of UTC.
fn parse_timezone_offset(offset: &str) -> Option<i16> {
    if offset.is_empty() || offset == "Z" || offset == "z" {
        return Some(0);
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1i16,
        b'-' => -1i16,
        _ => return None,
    };
    let digits = &offset[1..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) || !matches!(digits.len(), 2 | 4) {
        return None;
    }

    let hours: i16 = digits[..2].parse().ok()?;
    let minutes: i16 = digits.get(2..4).map_or(Some(0), |m| m.parse().ok())?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// Formats an offset in minutes as a timezone string (Z, +HH:MM, -HH:MM).
fn format_timezone_offset(offset_min: i16) -> String {
    if offset_min == 0 {
        return "Z".to_string();
    }

    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs_offset = offset_min.abs();
    format!("{}{:02}:{:02}", sign, abs_offset / 60, abs_offset % 60)
}

/// Parses fractional seconds and returns microseconds (truncated).
fn parse_fractional_seconds(frac: &str) -> i64 {
    frac.bytes()
        .chain(std::iter::repeat(b'0'))
        .take(6)
        .fold(0, |acc, b| acc * 10 + (b - b'0') as i64)
}

/// Formats microseconds as fractional seconds string, omitting if zero.
fn format_fractional_seconds(us: i64) -> String {
    if us == 0 {
        return String::new();
    }
    let digits = format!("{:06}", us);
    format!(".{}", digits.trim_end_matches('0'))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since the Unix epoch for a civil date (Howard Hinnant's algorithm).
fn date_to_days(year: i32, month: u32, day: u32) -> i32 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let m = if month <= 2 { month as i64 + 9 } else { month as i64 - 3 };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32;
    let doy = (153 * m as u32 + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    (era * 146097 + doe as i64 - 719468) as i32
}

/// Converts days since the Unix epoch to (year, month, day).
fn days_to_date(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };

    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Formats microseconds since the epoch as RFC 3339 in the given offset.
fn format_datetime_rfc3339(epoch_micros: i64, offset_min: i16) -> String {
    // Local time = UTC + offset
    let local_us = epoch_micros + offset_min as i64 * MICROSECONDS_PER_MINUTE;
    let days = local_us.div_euclid(MICROSECONDS_PER_DAY);
    let time_micros = local_us.rem_euclid(MICROSECONDS_PER_DAY);

    let (year, month, day) = days_to_date(days);

    let hours = time_micros / MICROSECONDS_PER_HOUR;
    let minutes = time_micros % MICROSECONDS_PER_HOUR / MICROSECONDS_PER_MINUTE;
    let seconds = time_micros % MICROSECONDS_PER_MINUTE / MICROSECONDS_PER_SECOND;
    let microseconds = time_micros % MICROSECONDS_PER_SECOND;

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{}",
        year,
        month,
        day,
        hours,
        minutes,
        seconds,
        format_fractional_seconds(microseconds),
        format_timezone_offset(offset_min)
    )
}

/// Formats Unix seconds as RFC 3339 UTC. Returns `None` if the value is
/// outside the representable range.
pub fn format_unix_seconds(seconds: i64) -> Option<String> {
    seconds
        .checked_mul(MICROSECONDS_PER_SECOND)
        .map(|micros| format_datetime_rfc3339(micros, 0))
}
