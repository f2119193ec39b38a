//! Timestamp normalization for heterogeneous upstream encodings.
//!
//! The data endpoint sends timestamps as epoch seconds, epoch
//! milliseconds, numeric strings, ISO-8601 strings with or without an
//! offset designator, and occasionally wrapped in a `{"timestamp": ...}`
//! object. Readings are near-real-time, so ambiguity is resolved by
//! generating every plausible interpretation and keeping the one closest
//! to the current wall-clock time.
//!
//! `normalize` is total: it never panics and always returns either a
//! formatted instant, the raw value echoed as text, or the placeholder
//! dash for absent input.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Rendered for absent values, both timestamps and sensor fields.
pub const PLACEHOLDER: &str = "—";

/// Numeric values below this magnitude are read as epoch seconds,
/// above it as epoch milliseconds.
const SECONDS_MAGNITUDE_CUTOFF: f64 = 1e11;

/// Display timezone for all rendered instants, regardless of the
/// viewer's local zone. America/Sao_Paulo; fixed UTC-3 since Brazil
/// abolished DST in 2019.
fn reference_offset() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).expect("static UTC-3 offset")
}

/// Normalize an arbitrary raw timestamp into a display string, anchored
/// to the current wall-clock time.
pub fn normalize(raw: &Value) -> String {
    normalize_at(raw, Utc::now())
}

/// Deterministic core of [`normalize`]. `now` anchors the
/// closest-to-now disambiguation between candidate interpretations.
pub fn normalize_at(raw: &Value, now: DateTime<Utc>) -> String {
    let inner = unwrap_wrapper(raw);
    if is_absent(inner) {
        return PLACEHOLDER.to_string();
    }

    let now_ms = now.timestamp_millis();
    let best = candidate_epochs_ms(inner)
        .into_iter()
        .min_by_key(|ms| (ms - now_ms).abs());

    if let Some(ms) = best {
        if let Some(instant) = Utc.timestamp_millis_opt(ms).single() {
            return format_instant(instant);
        }
    }

    match direct_calendar_parse(inner) {
        Some(instant) => format_instant(instant),
        None => echo(inner),
    }
}

/// Strip a single `{"timestamp": ...}` wrapper, if present.
fn unwrap_wrapper(raw: &Value) -> &Value {
    raw.get("timestamp").unwrap_or(raw)
}

/// Null and blank strings render as the placeholder, not as an echo.
fn is_absent(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Build the candidate set of millisecond epochs for a raw value.
/// Duplicates are allowed; only finite, strictly-positive epochs that
/// materialize as valid instants survive.
fn candidate_epochs_ms(raw: &Value) -> Vec<i64> {
    let mut epochs: Vec<f64> = Vec::new();

    // Digit-only strings and plain numbers: magnitude decides between
    // a seconds and a milliseconds reading.
    if let Some(x) = digit_like(raw) {
        if x.abs() < SECONDS_MAGNITUDE_CUTOFF {
            epochs.push(x * 1000.0);
        } else {
            epochs.push(x);
        }
    }

    // ISO-like strings. An unmarked string (no Z, no offset) is tried
    // both in the reference timezone and as UTC.
    if let Value::String(s) = raw {
        let s = s.trim();
        if s.contains('T') {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
                epochs.push(parsed.timestamp_millis() as f64);
            }
            if !has_explicit_offset(s) {
                if let Ok(naive) = s.parse::<NaiveDateTime>() {
                    if let Some(local) = reference_offset().from_local_datetime(&naive).single() {
                        epochs.push(local.timestamp_millis() as f64);
                    }
                    epochs.push(Utc.from_utc_datetime(&naive).timestamp_millis() as f64);
                }
            }
        }
    }

    // Plain numeric coercion contributes both scalings regardless of
    // the magnitude rule above.
    if let Some(x) = coerced_number(raw) {
        epochs.push(x);
        epochs.push(x * 1000.0);
    }

    epochs
        .into_iter()
        .filter(|ms| ms.is_finite() && *ms > 0.0 && *ms < i64::MAX as f64)
        .filter_map(|ms| {
            let ms = ms as i64;
            Utc.timestamp_millis_opt(ms).single().map(|_| ms)
        })
        .collect()
}

/// A plain number, or a string consisting solely of ASCII digits.
fn digit_like(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

/// Anything coercible to a plain number.
fn coerced_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether an ISO-like string carries an explicit UTC or offset
/// designator after its `T` separator.
fn has_explicit_offset(s: &str) -> bool {
    match s.find('T') {
        Some(t) => s[t + 1..].contains(|c| matches!(c, 'Z' | 'z' | '+' | '-')),
        None => false,
    }
}

/// Last-resort calendar parse for strings that produced no epoch
/// candidates (e.g. a space-separated datetime or a bare date).
fn direct_calendar_parse(raw: &Value) -> Option<DateTime<Utc>> {
    let s = raw.as_str()?.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return anchor_reference(naive);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return anchor_reference(date.and_hms_opt(0, 0, 0)?);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(s) {
        return Some(parsed.with_timezone(&Utc));
    }
    None
}

fn anchor_reference(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    reference_offset()
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&reference_offset())
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

/// Echo an unparseable value back as text. Strings are returned
/// verbatim, everything else as its JSON rendering.
fn echo(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
