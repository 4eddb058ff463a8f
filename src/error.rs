//! Error types for the fact ledger
//!
//! Storage and I/O failures are fatal to the run. Cancellation of a prompt
//! aborts only the current action and is reported by the menu loop.

use thiserror::Error;

/// Main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// SQL execution or connection failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure (export file, database directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An exported CSV file could not be parsed back
    #[error("Malformed CSV: {0}")]
    Csv(String),

    /// The user interrupted a prompt (Ctrl-C) or closed its input (Ctrl-D)
    #[error("Selection cancelled")]
    Cancelled,

    /// The line editor failed for a reason other than cancellation
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl LedgerError {
    /// True for errors that abort only the current action
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LedgerError::Cancelled)
    }
}

impl From<rustyline::error::ReadlineError> for LedgerError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        use rustyline::error::ReadlineError;
        match err {
            ReadlineError::Interrupted | ReadlineError::Eof => LedgerError::Cancelled,
            ReadlineError::Io(e) => LedgerError::Io(e),
            other => LedgerError::Prompt(other.to_string()),
        }
    }
}

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::error::ReadlineError;

    #[test]
    fn test_interrupt_and_eof_are_cancellations() {
        assert!(LedgerError::from(ReadlineError::Interrupted).is_cancellation());
        assert!(LedgerError::from(ReadlineError::Eof).is_cancellation());
    }

    #[test]
    fn test_storage_error_is_fatal() {
        let err = LedgerError::from(rusqlite::Error::InvalidQuery);
        assert!(!err.is_cancellation());
        assert!(err.to_string().starts_with("Storage error"));
    }
}
