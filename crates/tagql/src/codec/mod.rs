//! Mapping between Rust types and stored scalar [`Value`]s.
//!
//! Every type that can be bound or selected implements [`Codec`]. Wrappers
//! such as `Option<T>` and [`Tagged<M, T>`](crate::Tagged) implement it by
//! delegating to the wrapped type, so they compose without special cases:
//! `Option<Tagged<User, i64>>` needs no impl of its own.
//!
//! Representation is chosen by type. A timestamp column declared as
//! `DateTime<Utc>` is stored as ISO-8601 text, while [`UnixTime`] stores the
//! same instant as integer seconds.

mod datetime;
mod extra;
mod json;
mod primitives;
mod uuids;

pub use datetime::UnixTime;
pub use json::Json;
pub use uuids::UuidText;

use crate::error::DecodeError;
use crate::value::{StorageKind, Value};

/// Bidirectional mapping between a Rust type and a stored [`Value`].
pub trait Codec: Sized {
    /// Storage class this type occupies.
    const KIND: StorageKind;

    /// Whether `NULL` is a legal stored value.
    const NULLABLE: bool = false;

    fn encode(&self) -> Value;

    fn decode(value: Value) -> Result<Self, DecodeError>;
}

impl<T: Codec> Codec for Option<T> {
    const KIND: StorageKind = T::KIND;
    const NULLABLE: bool = true;

    fn encode(&self) -> Value {
        match self {
            Some(v) => v.encode(),
            None => Value::Null,
        }
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::decode(other).map(Some),
        }
    }
}

impl<T: Codec> Codec for Box<T> {
    const KIND: StorageKind = T::KIND;
    const NULLABLE: bool = T::NULLABLE;

    fn encode(&self) -> Value {
        (**self).encode()
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        T::decode(value).map(Box::new)
    }
}
