//! JSON encoding of backend values.
//!
//! Temporal kinds follow ISO-8601: dates as `YYYY-MM-DD`, datetimes as
//! `YYYY-MM-DDTHH:MM:SS[.ffffff][±HH:MM]`, durations as the time of day
//! they reach when added to midnight (`HH:MM:SS[.ffffff]`).

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde_json::{Map, Number, Value};

use crate::{Datum, EncodingError};

const SECONDS_PER_DAY: i64 = 86_400;

/// Encode a [`Datum`] into a JSON value.
///
/// # Errors
/// Returns [`EncodingError::IntegerOutOfRange`] for integers wider than 64 bits,
/// [`EncodingError::NonFiniteFloat`] for NaN or infinities, and
/// [`EncodingError::NegativeDuration`] for durations below zero. Failures inside
/// a list or map are wrapped in [`EncodingError::Nested`] with their path.
pub fn encode(datum: &Datum) -> Result<Value, EncodingError> {
    match datum {
        Datum::Null => Ok(Value::Null),
        Datum::Bool(b) => Ok(Value::Bool(*b)),
        Datum::Int(i) => encode_int(*i),
        Datum::UInt(u) => encode_uint(*u),
        Datum::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or(EncodingError::NonFiniteFloat { value: *f }),
        Datum::Text(s) => Ok(Value::String(s.clone())),
        Datum::Date(d) => Ok(Value::String(iso_date(*d))),
        Datum::DateTime(dt) => Ok(Value::String(iso_datetime(*dt))),
        Datum::DateTimeTz(dt) => Ok(Value::String(iso_datetime_tz(dt))),
        Datum::Duration(d) => iso_time_of_day(*d).map(Value::String),
        Datum::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| encode(item).map_err(|e| e.within(&format!("[{i}]"))))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Datum::Map(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let encoded = encode(value).map_err(|e| e.within(&format!(".{key}")))?;
                out.insert(key.clone(), encoded);
            }
            Ok(Value::Object(out))
        }
    }
}

fn encode_int(value: i128) -> Result<Value, EncodingError> {
    if let Ok(i) = i64::try_from(value) {
        return Ok(Value::from(i));
    }
    u64::try_from(value)
        .map(Value::from)
        .map_err(|_| EncodingError::IntegerOutOfRange { value: value.to_string() })
}

fn encode_uint(value: u128) -> Result<Value, EncodingError> {
    u64::try_from(value)
        .map(Value::from)
        .map_err(|_| EncodingError::IntegerOutOfRange { value: value.to_string() })
}

/// `YYYY-MM-DD`.
#[must_use]
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DDTHH:MM:SS`, with `.ffffff` appended when the microsecond
/// component is non-zero.
#[must_use]
pub fn iso_datetime(dt: NaiveDateTime) -> String {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    push_micros(&mut out, dt.nanosecond());
    out
}

/// Like [`iso_datetime`] followed by the `±HH:MM` offset.
#[must_use]
pub fn iso_datetime_tz(dt: &DateTime<FixedOffset>) -> String {
    let mut out = iso_datetime(dt.naive_local());
    let _ = write!(out, "{}", dt.format("%:z"));
    out
}

/// Time of day reached by adding `delta` to midnight.
///
/// Whole days are discarded, so `1 day 02:00:00` encodes as `02:00:00`.
///
/// # Errors
/// Returns [`EncodingError::NegativeDuration`] if `delta` is below zero.
pub fn iso_time_of_day(delta: TimeDelta) -> Result<String, EncodingError> {
    if delta < TimeDelta::zero() {
        return Err(EncodingError::NegativeDuration { seconds: delta.num_seconds() });
    }
    let seconds = delta.num_seconds().rem_euclid(SECONDS_PER_DAY);
    let mut out = format!(
        "{:02}:{:02}:{:02}",
        seconds / 3_600,
        seconds % 3_600 / 60,
        seconds % 60
    );
    push_micros(&mut out, u32::try_from(delta.subsec_nanos()).unwrap_or(0));
    Ok(out)
}

fn push_micros(out: &mut String, nanos: u32) {
    // Leap seconds carry nanos past one second; only the sub-second part counts.
    let micros = nanos % 1_000_000_000 / 1_000;
    if micros != 0 {
        let _ = write!(out, ".{micros:06}");
    }
}
