//! Codecs for optional third-party scalar types.

#[cfg(feature = "rust_decimal")]
mod decimal {
    use crate::codec::Codec;
    use crate::error::DecodeError;
    use crate::value::{StorageKind, Value};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    /// Stored as TEXT to keep full precision.
    impl Codec for Decimal {
        const KIND: StorageKind = StorageKind::Text;

        fn encode(&self) -> Value {
            Value::Text(self.to_string())
        }

        fn decode(value: Value) -> Result<Self, DecodeError> {
            match value {
                Value::Text(text) => Decimal::from_str(&text).map_err(|e| {
                    DecodeError::malformed(Self::KIND, Value::Text(text.clone()), e.to_string())
                }),
                Value::Integer(n) => Ok(Decimal::from(n)),
                Value::Real(v) => Decimal::try_from(v)
                    .map_err(|_| DecodeError::out_of_range(Self::KIND, Value::Real(v))),
                other => Err(DecodeError::unexpected(Self::KIND, other)),
            }
        }
    }
}

#[cfg(feature = "time")]
mod offset_date_time {
    use crate::codec::Codec;
    use crate::error::DecodeError;
    use crate::value::{StorageKind, Value};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    /// RFC 3339 text.
    impl Codec for OffsetDateTime {
        const KIND: StorageKind = StorageKind::Text;

        fn encode(&self) -> Value {
            match self.format(&Rfc3339) {
                Ok(text) => Value::Text(text),
                // Years outside 0..=9999 have no RFC 3339 form
                Err(_) => Value::Null,
            }
        }

        fn decode(value: Value) -> Result<Self, DecodeError> {
            match value {
                Value::Text(text) => OffsetDateTime::parse(&text, &Rfc3339).map_err(|e| {
                    DecodeError::malformed(Self::KIND, Value::Text(text.clone()), e.to_string())
                }),
                other => Err(DecodeError::unexpected(Self::KIND, other)),
            }
        }
    }
}
