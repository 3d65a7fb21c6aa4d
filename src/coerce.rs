//! Conversion of raw text tokens into typed values.
//!
//! | Type | Rule | Fails |
//! |---|---|---|
//! | `Flag` | presence → `true` | never |
//! | `String` | identity | never |
//! | `Integer` | integer literal (see [`parse_integer`]) | non-numeric text |
//! | `Time` | one of the accepted formats (see [`parse_time`]) | unparseable text |
//! | `List` | split on `,` | never |
//! | `OneOf` | exact match against the allowed set | no match |

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::types::{OptValue, OptionType};

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Coerce `raw` according to `kind`. `None` means the text is not valid for
/// the type; callers report it as an invalid argument.
pub fn coerce(kind: &OptionType, raw: &str) -> Option<OptValue> {
    match kind {
        OptionType::Flag => Some(OptValue::Bool(true)),
        OptionType::String => Some(OptValue::Str(raw.to_string())),
        OptionType::Integer => parse_integer(raw).map(OptValue::Integer),
        OptionType::Time => parse_time(raw).map(OptValue::Time),
        OptionType::List => Some(OptValue::List(split_list(raw))),
        OptionType::OneOf(allowed) => allowed
            .iter()
            .find(|name| *name == raw)
            .map(|name| OptValue::Symbol(name.clone())),
    }
}

/// Parse an integer literal: optional sign, then `0x` hex, `0b` binary,
/// `0o` or leading-zero octal, or decimal. Single underscores may separate
/// digits.
pub fn parse_integer(text: &str) -> Option<i64> {
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(d) = strip_radix(body, 'x') {
        (16, d)
    } else if let Some(d) = strip_radix(body, 'b') {
        (2, d)
    } else if let Some(d) = strip_radix(body, 'o') {
        (8, d)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }
    let digits = digits.replace('_', "");
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i64::from_str_radix(&format!("{sign}{digits}"), radix).ok()
}

fn strip_radix(body: &str, marker: char) -> Option<&str> {
    let rest = body.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

/// Parse a date or date-time. Zoned forms keep their offset; naive forms are
/// taken as UTC, and bare dates as midnight UTC.
pub fn parse_time(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t);
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(text) {
        return Some(t);
    }
    for fmt in ZONED_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(text, fmt) {
            return Some(t);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(t.and_utc().fixed_offset());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|t| t.and_utc().fixed_offset());
        }
    }
    None
}

fn split_list(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::to_string).collect()
}
