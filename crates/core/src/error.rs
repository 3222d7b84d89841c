//! # Error Module
//!
//! Domain errors that do not involve the store.

use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionKind(String),

    #[error("Unknown history filter: {0}")]
    UnknownHistoryFilter(String),

    #[error("Session for account {0} has expired")]
    SessionExpired(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
