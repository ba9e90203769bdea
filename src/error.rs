use std::{fmt::Display, sync::PoisonError};

use bincode::ErrorKind;

/// Custom Result type for minisql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for minisql
///
/// Every variant except `Internal` is a domain error: it is passed through
/// unchanged by every layer. `Internal` carries unexpected failures (I/O,
/// serialization, poisoned locks) until a layer re-tags it with context.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed statement text
    Parse {
        message: String,
        sql: Option<String>,
        position: Option<usize>,
    },
    /// Value or schema mismatch
    Validation {
        message: String,
        table: Option<String>,
        column: Option<String>,
    },
    /// Reference to a table that is not registered
    TableNotFound { table: String, message: String },
    /// Reference to a column that is not part of the table's schema
    ColumnNotFound { table: String, column: String },
    /// Registry-level conflict or persistence failure
    Storage {
        message: String,
        operation: Option<String>,
    },
    /// Plan construction failure, keyed by the statement kind
    Processing { message: String, node: String },
    /// Operation failure that was not already a domain error
    Execution {
        message: String,
        operation: Option<String>,
    },
    /// Internal error (I/O, serialization, etc.)
    Internal(String),
}

impl Error {
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
            sql: None,
            position: None,
        }
    }

    pub fn parse_at(message: impl Into<String>, position: usize) -> Self {
        Error::Parse {
            message: message.into(),
            sql: None,
            position: Some(position),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            table: None,
            column: None,
        }
    }

    pub fn storage(message: impl Into<String>, operation: &str) -> Self {
        Error::Storage {
            message: message.into(),
            operation: Some(operation.to_string()),
        }
    }

    /// The human-readable message without the error kind prefix
    pub fn message(&self) -> String {
        match self {
            Error::Parse { message, .. }
            | Error::Validation { message, .. }
            | Error::TableNotFound { message, .. }
            | Error::Storage { message, .. }
            | Error::Processing { message, .. }
            | Error::Execution { message, .. } => message.clone(),
            Error::ColumnNotFound { table, column } => {
                format!("Column '{}' not found in table '{}'", column, table)
            }
            Error::Internal(message) => message.clone(),
        }
    }

    /// Returns true for every error kind that must be propagated unchanged
    pub fn is_domain(&self) -> bool {
        !matches!(self, Error::Internal(_))
    }

    /// Attaches the table name to a validation error that does not carry one yet
    pub fn with_table(self, name: &str) -> Self {
        match self {
            Error::Validation {
                message,
                table: None,
                column,
            } => Error::Validation {
                message,
                table: Some(name.to_string()),
                column,
            },
            err => err,
        }
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(value: PoisonError<T>) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<Box<ErrorKind>> for Error {
    fn from(value: Box<ErrorKind>) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse {
                position: Some(pos),
                ..
            } => write!(f, "parse error: {} (at position {})", self.message(), pos),
            Error::Parse { .. } => write!(f, "parse error: {}", self.message()),
            Error::Validation { .. } => write!(f, "validation error: {}", self.message()),
            Error::TableNotFound { .. } => write!(f, "table error: {}", self.message()),
            Error::ColumnNotFound { .. } => write!(f, "column error: {}", self.message()),
            Error::Storage { .. } => write!(f, "storage error: {}", self.message()),
            Error::Processing { .. } => write!(f, "processing error: {}", self.message()),
            Error::Execution { .. } => write!(f, "execution error: {}", self.message()),
            Error::Internal(err) => write!(f, "internal error: {}", err),
        }
    }
}
