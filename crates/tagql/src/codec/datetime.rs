use super::Codec;
use crate::error::DecodeError;
use crate::value::{StorageKind, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Shortest of millisecond, microsecond or nanosecond text that keeps every digit.
fn timestamp_format(nanos: u32) -> &'static str {
    if nanos % 1_000_000 == 0 {
        "%Y-%m-%d %H:%M:%S%.3f"
    } else if nanos % 1_000 == 0 {
        "%Y-%m-%d %H:%M:%S%.6f"
    } else {
        "%Y-%m-%d %H:%M:%S%.9f"
    }
}

/// ISO-8601 text, `YYYY-MM-DD HH:MM:SS.SSS` in UTC.
///
/// Sub-millisecond instants get six or nine fractional digits so decoding
/// returns the same instant.
impl Codec for DateTime<Utc> {
    const KIND: StorageKind = StorageKind::Text;

    fn encode(&self) -> Value {
        let format = timestamp_format(self.timestamp_subsec_nanos());
        Value::Text(self.format(format).to_string())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Text(text) => match parse_timestamp(&text) {
                Some(ts) => Ok(ts),
                None => Err(DecodeError::malformed(
                    Self::KIND,
                    Value::Text(text),
                    "not an ISO-8601 timestamp",
                )),
            },
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}

impl Codec for NaiveDate {
    const KIND: StorageKind = StorageKind::Text;

    fn encode(&self) -> Value {
        Value::Text(self.format(DATE_FORMAT).to_string())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Text(text) => {
                // Accept a full timestamp and keep the date part
                let head = text.get(..10).unwrap_or(&text);
                NaiveDate::parse_from_str(head, DATE_FORMAT).map_err(|e| {
                    DecodeError::malformed(Self::KIND, Value::Text(text.clone()), e.to_string())
                })
            }
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}

/// A UTC instant stored as whole seconds since the Unix epoch.
///
/// Sub-second precision is dropped on construction, so an encoded value
/// always decodes back to an equal `UnixTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnixTime(DateTime<Utc>);

impl UnixTime {
    /// Truncate `instant` to whole seconds.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant.with_nanosecond(0).unwrap_or(instant))
    }

    pub fn from_timestamp(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }

    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for UnixTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self::new(value)
    }
}

impl From<UnixTime> for DateTime<Utc> {
    fn from(value: UnixTime) -> Self {
        value.0
    }
}

impl Codec for UnixTime {
    const KIND: StorageKind = StorageKind::Integer;

    fn encode(&self) -> Value {
        Value::Integer(self.timestamp())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Integer(n) => Self::from_timestamp(n)
                .ok_or_else(|| DecodeError::out_of_range(Self::KIND, Value::Integer(n))),
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}
