//! Phantom-tagged newtype for identifiers and other raw values.
//!
//! `Tagged<User, i64>` and `Tagged<Reminder, i64>` share a representation but
//! are different types, so a user id cannot be passed where a reminder id is
//! expected. The tag exists only at compile time.
//!
//! # Example
//! ```ignore
//! use tagql::Tagged;
//!
//! pub type UserId = Tagged<User, i64>;
//!
//! let id = UserId::new(1);
//! assert_eq!(*id.raw(), 1);
//! ```

use crate::codec::Codec;
use crate::error::DecodeError;
use crate::value::{StorageKind, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A `Raw` value distinguished by the compile-time marker `Tag`.
///
/// All trait impls delegate to `Raw` and place no bounds on `Tag`.
pub struct Tagged<Tag, Raw> {
    raw: Raw,
    _tag: PhantomData<fn() -> Tag>,
}

impl<Tag, Raw> Tagged<Tag, Raw> {
    pub const fn new(raw: Raw) -> Self {
        Self {
            raw,
            _tag: PhantomData,
        }
    }

    pub fn raw(&self) -> &Raw {
        &self.raw
    }

    pub fn into_raw(self) -> Raw {
        self.raw
    }

    /// Transform the raw value, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(Raw) -> U) -> Tagged<Tag, U> {
        Tagged::new(f(self.raw))
    }
}

impl<Tag, Raw> From<Raw> for Tagged<Tag, Raw> {
    fn from(raw: Raw) -> Self {
        Self::new(raw)
    }
}

impl<Tag, Raw> AsRef<Raw> for Tagged<Tag, Raw> {
    fn as_ref(&self) -> &Raw {
        &self.raw
    }
}

impl<Tag, Raw: Clone> Clone for Tagged<Tag, Raw> {
    fn clone(&self) -> Self {
        Self::new(self.raw.clone())
    }
}

impl<Tag, Raw: Copy> Copy for Tagged<Tag, Raw> {}

impl<Tag, Raw: PartialEq> PartialEq for Tagged<Tag, Raw> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<Tag, Raw: Eq> Eq for Tagged<Tag, Raw> {}

impl<Tag, Raw: PartialOrd> PartialOrd for Tagged<Tag, Raw> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.raw.partial_cmp(&other.raw)
    }
}

impl<Tag, Raw: Ord> Ord for Tagged<Tag, Raw> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<Tag, Raw: Hash> Hash for Tagged<Tag, Raw> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<Tag, Raw: Default> Default for Tagged<Tag, Raw> {
    fn default() -> Self {
        Self::new(Raw::default())
    }
}

impl<Tag, Raw: fmt::Debug> fmt::Debug for Tagged<Tag, Raw> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tagged").field(&self.raw).finish()
    }
}

impl<Tag, Raw: fmt::Display> fmt::Display for Tagged<Tag, Raw> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl<Tag, Raw: Serialize> Serialize for Tagged<Tag, Raw> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, Tag, Raw: Deserialize<'de>> Deserialize<'de> for Tagged<Tag, Raw> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Raw::deserialize(deserializer).map(Self::new)
    }
}

impl<Tag, Raw: Codec> Codec for Tagged<Tag, Raw> {
    const KIND: StorageKind = Raw::KIND;
    const NULLABLE: bool = Raw::NULLABLE;

    fn encode(&self) -> Value {
        self.raw.encode()
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        Raw::decode(value).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct User;
    struct Reminder;

    #[test]
    fn equality_and_hash_follow_raw() {
        let a: Tagged<User, i64> = Tagged::new(7);
        let b: Tagged<User, i64> = 7.into();
        assert_eq!(a, b);
        assert!(Tagged::<User, i64>::new(1) < a);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn tag_does_not_need_traits() {
        // `Reminder` implements nothing, yet the wrapper is Copy + Debug.
        let id: Tagged<Reminder, u32> = Tagged::new(3);
        let copy = id;
        assert_eq!(format!("{id:?}"), "Tagged(3)");
        assert_eq!(copy.to_string(), "3");
        assert_eq!(std::mem::size_of::<Tagged<Reminder, u32>>(), 4);
    }

    #[test]
    fn serde_is_transparent() {
        let id: Tagged<User, i64> = Tagged::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: Tagged<User, i64> = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn map_keeps_tag() {
        let id: Tagged<User, i64> = Tagged::new(5);
        let text: Tagged<User, String> = id.map(|n| n.to_string());
        assert_eq!(text.into_raw(), "5");
    }
}
