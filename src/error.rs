use bincode::ErrorKind;
use thiserror::Error;

use crate::sql::executor::ResultSet;

/// Custom Result type for tabledb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tabledb
///
/// Every variant is recoverable: the session reports it and waits for the next command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed command text, carries the offending fragment
    #[error("syntax error: {0}")]
    Syntax(String),
    /// Missing table or column
    #[error("not found: {0}")]
    NotFound(String),
    /// Table name already taken
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Literal does not fit the column type, or comparison is undefined for the operands
    #[error("type error: {0}")]
    Type(String),
    /// Arity or shape mismatch
    #[error("validation error: {0}")]
    Validation(String),
    /// I/O or encoding failure while loading or saving
    #[error("storage error: {0}")]
    Storage(String),
    /// A mutating command changed the in-memory tables but the write-back failed
    #[error("change applied in memory but not persisted: {reason}")]
    Unpersisted {
        result: Box<ResultSet>,
        reason: String,
    },
}

impl Error {
    /// Wraps a failed save of a mutating command, keeping the result it would have returned
    pub fn unpersisted(result: ResultSet, cause: Error) -> Self {
        let reason = match cause {
            Error::Storage(msg) => msg,
            other => other.to_string(),
        };
        Error::Unpersisted {
            result: Box::new(result),
            reason,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Storage(value.to_string())
    }
}

impl From<Box<ErrorKind>> for Error {
    fn from(value: Box<ErrorKind>) -> Self {
        Error::Storage(value.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Error::Storage(value.error.to_string())
    }
}
