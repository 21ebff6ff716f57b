//! Positional row decoding.

use crate::codec::Codec;
use crate::error::DecodeError;
use crate::value::Value;

/// Cursor over one result row.
///
/// Values are consumed left to right; decode errors are labelled with the
/// result column they came from.
pub struct RowReader<'a> {
    values: std::vec::IntoIter<Value>,
    labels: &'a [String],
    index: usize,
}

impl<'a> RowReader<'a> {
    pub fn new(values: Vec<Value>, labels: &'a [String]) -> Self {
        Self {
            values: values.into_iter(),
            labels,
            index: 0,
        }
    }

    fn label(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{index}"))
    }

    /// Take the next raw value.
    pub fn next_value(&mut self) -> Option<Value> {
        let value = self.values.next()?;
        self.index += 1;
        Some(value)
    }

    /// Decode the next value as `T`.
    pub fn next<T: Codec>(&mut self) -> Result<T, DecodeError> {
        let index = self.index;
        match self.next_value() {
            Some(value) => T::decode(value).map_err(|e| e.at_column(self.label(index))),
            None => Err(DecodeError::unexpected_null(T::KIND).at_column(self.label(index))),
        }
    }

    /// Values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// True if the next `n` values are all NULL.
    pub fn next_all_null(&self, n: usize) -> bool {
        let rest = self.values.as_slice();
        rest.len() >= n && rest[..n].iter().all(Value::is_null)
    }

    /// Discard `n` values.
    pub fn skip(&mut self, n: usize) {
        for _ in 0..n {
            if self.next_value().is_none() {
                break;
            }
        }
    }
}
