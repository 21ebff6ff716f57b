//! Error types for tagql

use crate::value::{StorageKind, Value};
use std::fmt;
use thiserror::Error;

/// Result type alias for tagql operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Top-level error returned by statement execution.
///
/// The three underlying kinds stay distinguishable so callers can treat a
/// programmer mistake (`Construction`) differently from a constraint
/// violation reported by the database (`Driver`).
#[derive(Debug, Error)]
pub enum QueryError {
    /// The statement could not be built
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// A result row could not be decoded into the requested shape
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The driver rejected or failed the statement
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// A row came back with a different column count than the statement selects
    #[error("Result shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// `fetch_one` found no rows
    #[error("Not found: {0}")]
    NotFound(String),
}

impl QueryError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a construction error
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Construction(_))
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Check if this is a driver error
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if the driver reported a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Driver(err) if err.kind == DriverErrorKind::Constraint)
    }
}

/// Raised while building a statement, never while rendering or executing it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("row {row} has {actual} values but {expected} columns were listed")]
    ArityMismatch {
        expected: usize,
        actual: usize,
        row: usize,
    },

    #[error("duplicate column \"{column}\" in table \"{table}\"")]
    DuplicateColumn { table: String, column: String },

    #[error("unknown column \"{column}\" for table \"{table}\"")]
    UnknownColumn { table: String, column: String },

    #[error("column \"{table}\".\"{column}\" is not in scope of this statement")]
    ColumnNotInScope { table: String, column: String },

    #[error("no columns to write for table \"{table}\"")]
    EmptyColumnList { table: String },

    #[error("table \"{table}\" has no primary key")]
    MissingPrimaryKey { table: String },

    #[error("UPDATE of \"{table}\" has no assignments")]
    EmptyAssignments { table: String },

    #[error("SQL template has {placeholders} placeholders but {arguments} arguments were given")]
    TemplateArity {
        placeholders: usize,
        arguments: usize,
    },

    #[error("malformed SQL template: {0}")]
    MalformedTemplate(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl ConstructionError {
    pub(crate) fn unknown_column(table: &str, column: &str) -> Self {
        Self::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub(crate) fn not_in_scope(table: &str, column: &str) -> Self {
        Self::ColumnNotInScope {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub(crate) fn duplicate_column(table: &str, column: &str) -> Self {
        Self::DuplicateColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

/// Why a value could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeReason {
    KindMismatch,
    UnexpectedNull,
    OutOfRange,
    Malformed(String),
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeReason::KindMismatch => f.write_str("storage kind mismatch"),
            DecodeReason::UnexpectedNull => f.write_str("unexpected NULL"),
            DecodeReason::OutOfRange => f.write_str("value out of range"),
            DecodeReason::Malformed(msg) => write!(f, "malformed value ({msg})"),
        }
    }
}

/// A stored value that does not fit the requested Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "column '{}': cannot decode {} as {expected}: {reason}",
    .column.as_deref().unwrap_or("?"),
    .actual.kind_name()
)]
pub struct DecodeError {
    /// Result column label, when known.
    pub column: Option<String>,
    pub expected: StorageKind,
    pub actual: Value,
    pub reason: DecodeReason,
}

impl DecodeError {
    fn new(expected: StorageKind, actual: Value, reason: DecodeReason) -> Self {
        Self {
            column: None,
            expected,
            actual,
            reason,
        }
    }

    /// Stored kind does not match.
    pub fn mismatch(expected: StorageKind, actual: Value) -> Self {
        Self::new(expected, actual, DecodeReason::KindMismatch)
    }

    /// NULL reached a non-optional target.
    pub fn unexpected_null(expected: StorageKind) -> Self {
        Self::new(expected, Value::Null, DecodeReason::UnexpectedNull)
    }

    /// Right kind, but outside the target's valid set.
    pub fn out_of_range(expected: StorageKind, actual: Value) -> Self {
        Self::new(expected, actual, DecodeReason::OutOfRange)
    }

    /// Right kind, but the content could not be parsed.
    pub fn malformed(expected: StorageKind, actual: Value, message: impl Into<String>) -> Self {
        Self::new(expected, actual, DecodeReason::Malformed(message.into()))
    }

    /// Classify a value that no decoding arm accepted.
    pub fn unexpected(expected: StorageKind, actual: Value) -> Self {
        if actual.is_null() {
            Self::unexpected_null(expected)
        } else {
            Self::mismatch(expected, actual)
        }
    }

    /// Attach the column label unless one is already set.
    pub fn at_column(mut self, column: impl Into<String>) -> Self {
        if self.column.is_none() {
            self.column = Some(column.into());
        }
        self
    }
}

/// Classification of driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// Unique, foreign key, check or NOT NULL constraint violation
    Constraint,
    /// Could not open or talk to the database
    Connection,
    /// Refused before reaching the database (e.g. by a query hook)
    Rejected,
    /// Anything else
    Other,
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriverErrorKind::Constraint => "constraint violation",
            DriverErrorKind::Connection => "connection failure",
            DriverErrorKind::Rejected => "rejected",
            DriverErrorKind::Other => "database error",
        };
        f.write_str(label)
    }
}

/// Error reported by a [`Driver`](crate::Driver), passed through untouched.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Constraint, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Connection, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Rejected, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Other, message)
    }

    /// Keep the underlying error as the source.
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}
