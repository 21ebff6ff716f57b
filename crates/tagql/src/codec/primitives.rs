use super::Codec;
use crate::error::DecodeError;
use crate::value::{StorageKind, Value};
use bytes::Bytes;

impl Codec for bool {
    const KIND: StorageKind = StorageKind::Boolean;

    fn encode(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Integer(n) => Ok(n != 0),
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}

macro_rules! impl_integer_codec {
    ($($ty:ty),* $(,)?) => {$(
        impl Codec for $ty {
            const KIND: StorageKind = StorageKind::Integer;

            fn encode(&self) -> Value {
                Value::Integer(i64::from(*self))
            }

            fn decode(value: Value) -> Result<Self, DecodeError> {
                match value {
                    Value::Integer(n) => <$ty>::try_from(n)
                        .map_err(|_| DecodeError::out_of_range(Self::KIND, Value::Integer(n))),
                    other => Err(DecodeError::unexpected(Self::KIND, other)),
                }
            }
        }
    )*};
}

impl_integer_codec!(i8, i16, i32, i64, u8, u16, u32);

impl Codec for f64 {
    const KIND: StorageKind = StorageKind::Real;

    fn encode(&self) -> Value {
        Value::Real(*self)
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Real(v) => Ok(v),
            // SQLite stores integral REAL values as INTEGER when it can
            Value::Integer(n) => Ok(n as f64),
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}

impl Codec for f32 {
    const KIND: StorageKind = StorageKind::Real;

    fn encode(&self) -> Value {
        Value::Real(f64::from(*self))
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        f64::decode(value).map(|v| v as f32)
    }
}

impl Codec for String {
    const KIND: StorageKind = StorageKind::Text;

    fn encode(&self) -> Value {
        Value::Text(self.clone())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}

impl Codec for Vec<u8> {
    const KIND: StorageKind = StorageKind::Blob;

    fn encode(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Blob(b) => Ok(b),
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}

impl Codec for Bytes {
    const KIND: StorageKind = StorageKind::Blob;

    fn encode(&self) -> Value {
        Value::Blob(self.to_vec())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        Vec::<u8>::decode(value).map(Bytes::from)
    }
}
