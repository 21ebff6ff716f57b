use super::Codec;
use crate::error::DecodeError;
use crate::value::{StorageKind, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::ops::Deref;

/// Any serde type stored as JSON text.
///
/// The value is serialized once, by [`Json::new`], so a value serde cannot
/// represent (e.g. a map with non-string keys) is rejected there instead of
/// at encode time.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Meta { tags: Vec<String> }
///
/// let meta = Json::new(Meta { tags: vec!["home".into()] })?;
/// ```
#[derive(Clone)]
pub struct Json<T> {
    value: T,
    text: String,
}

impl<T: Serialize> Json<T> {
    pub fn new(value: T) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string(&value)?;
        Ok(Self { value, text })
    }
}

impl<T> Json<T> {
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// The stored JSON text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for Json<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Json<T> {}

impl<T: fmt::Debug> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Json").field(&self.value).finish()
    }
}

impl<T: Serialize + DeserializeOwned> Codec for Json<T> {
    const KIND: StorageKind = StorageKind::Text;

    fn encode(&self) -> Value {
        Value::Text(self.text.clone())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Text(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Self { value, text }),
                Err(e) => Err(DecodeError::malformed(
                    Self::KIND,
                    Value::Text(text),
                    e.to_string(),
                )),
            },
            other => Err(DecodeError::unexpected(Self::KIND, other)),
        }
    }
}
