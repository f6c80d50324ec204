use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::Value;

/// A single value produced by the data-processing backend.
///
/// The set of kinds is closed: every result the gateway knows how to send
/// back is one of these variants, and [`encode`](crate::encode) visits each
/// of them explicitly.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Datum {
    /// JSON `null`.
    Null,
    Bool(bool),
    /// Signed integer of any width up to 128 bits.
    Int(i128),
    /// Unsigned integer of any width up to 128 bits.
    UInt(u128),
    Float(f64),
    Text(String),
    /// Calendar date without a time zone.
    Date(NaiveDate),
    /// Date and time without a time zone.
    DateTime(NaiveDateTime),
    /// Date and time with a fixed UTC offset.
    DateTimeTz(DateTime<FixedOffset>),
    /// Elapsed time; encoded as a time of day.
    Duration(TimeDelta),
    List(Vec<Datum>),
    Map(BTreeMap<String, Datum>),
}

impl Datum {
    /// Build a map datum from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Datum)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns `true` for [`Datum::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i.into())
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u.into())
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Self::Int(i.into())
    }
}

impl From<u64> for Datum {
    fn from(u: u64) -> Self {
        Self::UInt(u.into())
    }
}

impl From<f64> for Datum {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDate> for Datum {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Datum {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for Datum {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTimeTz(dt)
    }
}

impl From<TimeDelta> for Datum {
    fn from(d: TimeDelta) -> Self {
        Self::Duration(d)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
