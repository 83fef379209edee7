//! Timestamps to epoch milliseconds. Nothing here fails: text that matches no
//! known shape is `None`, and callers keep whatever date they already had.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Month names as they appear on the ingested sites, accented or not, with
/// the usual abbreviations.
pub const FRENCH_MONTHS: &[(&str, u32)] = &[
    ("janvier", 1),
    ("janv", 1),
    ("février", 2),
    ("fevrier", 2),
    ("févr", 2),
    ("fevr", 2),
    ("mars", 3),
    ("avril", 4),
    ("avr", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("juil", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("sept", 9),
    ("octobre", 10),
    ("oct", 10),
    ("novembre", 11),
    ("nov", 11),
    ("décembre", 12),
    ("decembre", 12),
    ("déc", 12),
    ("dec", 12),
];

static LITERAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:er|e)?\s+([^\W\d_]+)\.?\s+(\d{4})\b")
        .expect("LITERAL_DATE is a valid static regex pattern")
});

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})\b")
        .expect("NUMERIC_DATE is a valid static regex pattern")
});

/// RFC 3339 / RFC 2822 / ISO-like timestamps. Values without an offset are
/// read as UTC.
pub fn parse_iso(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.timestamp_millis());
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(date) = DateTime::parse_from_str(text, format) {
            return Some(date.timestamp_millis());
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, format) {
            return Some(date.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(midnight_millis)
}

/// Human-readable dates such as `13 octobre 2020`, `mardi 1er décembre 2020`
/// or `13/10/2020`, resolved to UTC midnight of that day.
pub fn parse_literal(text: &str) -> Option<i64> {
    parse_literal_with(text, FRENCH_MONTHS)
}

pub fn parse_literal_with(text: &str, months: &[(&str, u32)]) -> Option<i64> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = LITERAL_DATE.captures(&text) {
        let day = caps[1].parse::<u32>().ok()?;
        let month = month_number(&caps[2], months)?;
        let year = caps[3].parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).and_then(midnight_millis);
    }

    let caps = NUMERIC_DATE.captures(&text)?;
    let day = caps[1].parse::<u32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    let year = caps[3].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(midnight_millis)
}

/// ISO first, then the literal forms.
pub fn parse_any(text: &str) -> Option<i64> {
    parse_iso(text).or_else(|| parse_literal(text))
}

fn month_number(name: &str, months: &[(&str, u32)]) -> Option<u32> {
    months
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)
}

fn midnight_millis(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|datetime| datetime.and_utc().timestamp_millis())
}
