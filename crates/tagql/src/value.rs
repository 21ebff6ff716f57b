//! Scalar values exchanged with the database driver.

use std::fmt;

/// Declared storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Integer,
    Real,
    Text,
    Blob,
    /// Stored as INTEGER 0/1
    Boolean,
}

impl StorageKind {
    /// SQL type name used in column declarations.
    pub const fn sql_name(self) -> &'static str {
        match self {
            StorageKind::Integer => "INTEGER",
            StorageKind::Real => "REAL",
            StorageKind::Text => "TEXT",
            StorageKind::Blob => "BLOB",
            StorageKind::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A single scalar crossing the driver boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the stored kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }

    /// Render as an inline SQL literal.
    ///
    /// Only used for debug output; statements sent to the driver always bind.
    pub fn write_literal(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("NULL"),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Real(v) => out.push_str(&format!("{v:?}")),
            Value::Text(s) => {
                out.push('\'');
                out.push_str(&s.replace('\'', "''"));
                out.push('\'');
            }
            Value::Blob(bytes) => {
                out.push_str("X'");
                for b in bytes {
                    out.push_str(&format!("{b:02X}"));
                }
                out.push('\'');
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_literal(&mut out);
        f.write_str(&out)
    }
}
