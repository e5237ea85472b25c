//! ISO-8601 timestamps in the `YYYY-MM-DDThh:mm:ss.000Z` form most cloud
//! APIs expect, converted to and from Unix seconds (UTC).

use core::fmt::Write as _;
use heapless::String;

/// Length of a formatted timestamp, `YYYY-MM-DDThh:mm:ss.000Z`.
pub const ISO8601_LEN: usize = 24;

const SECONDS_PER_DAY: i64 = 86_400;

/// Formats Unix seconds as `YYYY-MM-DDThh:mm:ss.000Z`.
///
/// Returns `None` for years outside `0..=9999`.
pub fn format_iso8601(unix_seconds: i64) -> Option<String<ISO8601_LEN>> {
    let days = unix_seconds.div_euclid(SECONDS_PER_DAY);
    let seconds_of_day = unix_seconds.rem_euclid(SECONDS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    if !(0..=9999).contains(&year) {
        return None;
    }

    let mut out = String::new();
    write!(
        out,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.000Z",
        year,
        month,
        day,
        seconds_of_day / 3600,
        seconds_of_day % 3600 / 60,
        seconds_of_day % 60
    )
    .ok()?;
    Some(out)
}

/// Parses `YYYY-MM-DDThh:mm:ss` with an optional fractional part and a
/// trailing `Z` into Unix seconds. Fractions are dropped.
pub fn parse_iso8601(timestamp: &str) -> Option<i64> {
    let timestamp = timestamp.trim();
    let bytes = timestamp.as_bytes();
    if bytes.len() < 19
        || bytes[4] != b'-'
        || bytes[7] != b'-'
        || !matches!(bytes[10], b'T' | b't' | b' ')
        || bytes[13] != b':'
        || bytes[16] != b':'
    {
        return None;
    }

    let year = number(timestamp.get(0..4)?)?;
    let month = number(timestamp.get(5..7)?)?;
    let day = number(timestamp.get(8..10)?)?;
    let hour = number(timestamp.get(11..13)?)?;
    let minute = number(timestamp.get(14..16)?)?;
    let second = number(timestamp.get(17..19)?)?;

    let rest = timestamp.get(19..)?;
    let rest = match rest.strip_prefix('.') {
        Some(fraction) => fraction.trim_start_matches(|c: char| c.is_ascii_digit()),
        None => rest,
    };
    if !(rest.is_empty() || rest == "Z" || rest == "z") {
        return None;
    }

    if !(1..=12).contains(&month)
        || day < 1
        || day > days_in_month(year, month)
        || hour > 23
        || minute > 59
        || second > 60
    {
        return None;
    }

    let days = days_from_civil(year, month, day);
    Some(days * SECONDS_PER_DAY + hour * 3600 + minute * 60 + second)
}

fn number(digits: &str) -> Option<i64> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month_index = (month + 9) % 12;
    let day_of_year = (153 * month_index + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let days = days + 719_468;
    let era = days.div_euclid(146_097);
    let day_of_era = days - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let month = if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
