//! Scalar coercion helpers shared by the normalizer and the mock provider.
//!
//! Everything here is total: any JSON value (or none at all) maps to a
//! displayable string. Locale is fixed to pt-BR.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};

use crate::clock::{Clock, local_date};

/// Unit used when the caller does not ask for one.
pub const DEFAULT_UNIT: &str = "°";
pub const CELSIUS: &str = "°C";

/// Plausible range for a terrestrial surface temperature.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = -100.0..=100.0;

const MONTHS: [&str; 12] = [
    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.", "dez.",
];

const WEEKDAYS: [&str; 7] = ["dom.", "seg.", "ter.", "qua.", "qui.", "sex.", "sáb."];

/// Format a loosely typed temperature as `"{integer}{unit}"`.
///
/// Returns `"--{unit}"` when the value is absent and `"-{unit}"` when it is
/// present but unusable (no number in it, or outside ±100 after rounding).
pub fn coerce_temperature(value: Option<&Value>, unit: &str) -> String {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return format!("--{unit}");
    };

    let digits: String = loose_text(value)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let Some(parsed) = leading_float(&digits) else {
        return format!("-{unit}");
    };

    // half-up, so -2.5 rounds to -2
    let rounded = (parsed + 0.5).floor();
    if !TEMPERATURE_RANGE.contains(&rounded) {
        return format!("-{unit}");
    }

    format!("{}{unit}", rounded as i64)
}

/// Stringify a JSON value the way a dynamic runtime would before text
/// scrubbing: arrays are comma-joined, objects become an opaque tag.
fn loose_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(loose_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Parse the longest numeric prefix of `text` (`-?digits[.digits]`).
fn leading_float(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 {
            end = frac_end;
        }
    }

    if int_digits == 0 && !text[int_start..end].starts_with('.') {
        return None;
    }

    text[..end].parse().ok()
}

/// Short pt-BR date ("5 de mar.") for `value`, or for today when `value` is
/// absent or cannot be read as a calendar date.
pub fn format_localized_date(value: Option<&Value>, clock: &dyn Clock) -> String {
    let today = clock.today();
    let date = value.and_then(|v| parse_calendar_date(v, today)).unwrap_or(today);
    short_date(date)
}

pub fn short_date(date: NaiveDate) -> String {
    format!("{} de {}", date.day(), MONTHS[date.month0() as usize])
}

/// Lowercase pt-BR weekday abbreviation, e.g. "seg.".
pub fn weekday_label(date: NaiveDate) -> String {
    WEEKDAYS[date.weekday().num_days_from_sunday() as usize].to_string()
}

/// Normalize a provider-supplied weekday name: lowercase, cut at the first
/// hyphen ("Segunda-feira" -> "segunda").
pub fn short_label(text: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    let head = lower.split('-').next().unwrap_or_default().trim();
    (!head.is_empty()).then(|| head.to_string())
}

/// Read a calendar date from an RFC 3339 instant, `YYYY-MM-DD`, `DD/MM/YYYY`,
/// the provider's short `DD/MM`, or epoch milliseconds.
///
/// `DD/MM` takes the year from `today`, moving to the next year when the
/// result would lie more than half a year in the past.
pub fn parse_calendar_date(value: &Value, today: NaiveDate) -> Option<NaiveDate> {
    match value {
        Value::String(text) => parse_date_text(text.trim(), today),
        Value::Number(n) => {
            let millis = n.as_f64().filter(|m| m.is_finite())?;
            DateTime::<Utc>::from_timestamp_millis(millis as i64).and_then(local_date)
        }
        _ => None,
    }
}

fn parse_date_text(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return local_date(instant.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }

    parse_day_month(text, today)
}

fn parse_day_month(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (day, month) = text.split_once('/')?;
    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;

    let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if date < today - Duration::days(182) {
        return NaiveDate::from_ymd_opt(today.year() + 1, month, day);
    }
    Some(date)
}

/// Displayable text for a numeric or non-empty string value.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Integral floats lose their trailing ".0".
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Append `%` unless the text already carries one.
pub fn percent(text: &str) -> String {
    format!("{}%", text.trim_end_matches('%').trim_end())
}
