use super::Codec;
use crate::error::DecodeError;
use crate::value::{StorageKind, Value};
use uuid::Uuid;

/// 16 raw bytes. Hyphenated text is accepted when decoding.
impl Codec for Uuid {
    const KIND: StorageKind = StorageKind::Blob;

    fn encode(&self) -> Value {
        Value::Blob(self.as_bytes().to_vec())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Blob(bytes) => Uuid::from_slice(&bytes).map_err(|e| {
                DecodeError::malformed(Self::KIND, Value::Blob(bytes.clone()), e.to_string())
            }),
            Value::Text(text) => Uuid::parse_str(&text).map_err(|e| {
                DecodeError::malformed(Self::KIND, Value::Text(text.clone()), e.to_string())
            }),
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}

/// A UUID stored as lowercase hyphenated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UuidText(pub Uuid);

impl From<Uuid> for UuidText {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Codec for UuidText {
    const KIND: StorageKind = StorageKind::Text;

    fn encode(&self) -> Value {
        Value::Text(self.0.hyphenated().to_string())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Text(text) => Uuid::parse_str(&text).map(Self).map_err(|e| {
                DecodeError::malformed(Self::KIND, Value::Text(text.clone()), e.to_string())
            }),
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}
