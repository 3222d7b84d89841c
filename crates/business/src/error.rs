//! Business layer errors
//!
//! Every failure an operation can report, plus `ErrorKind`, the coarse
//! taxonomy callers branch on.

use atm_core::{AccountId, CoreError, HistoryFilter};
use atm_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidInput,
    InsufficientFunds,
    NoHistory,
    SessionExpired,
    StoreFailure,
}

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    // === Validation errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot transfer from account {0} to itself")]
    SelfTransfer(AccountId),

    #[error("Incorrect PIN")]
    IncorrectPin,

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    // === Not found errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Source account not found: {0}")]
    SourceNotFound(AccountId),

    #[error("Target account not found: {0}")]
    TargetNotFound(AccountId),

    #[error("No account matches the given name and PIN")]
    InvalidCredentials,

    // === Conflict errors ===
    #[error("Account name already taken: {0}")]
    NameTaken(String),

    #[error("No {filter} history for account {account_id}")]
    NoHistory {
        account_id: AccountId,
        filter: HistoryFilter,
    },

    // === Wrapped errors ===
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Store failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

impl BusinessError {
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::InvalidInput(_)
            | Self::SelfTransfer(_)
            | Self::IncorrectPin => ErrorKind::InvalidInput,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::AccountNotFound(_)
            | Self::SourceNotFound(_)
            | Self::TargetNotFound(_)
            | Self::InvalidCredentials => ErrorKind::NotFound,
            Self::NameTaken(_) => ErrorKind::AlreadyExists,
            Self::NoHistory { .. } => ErrorKind::NoHistory,
            Self::Core(CoreError::SessionExpired(_)) => ErrorKind::SessionExpired,
            Self::Core(_) => ErrorKind::InvalidInput,
            Self::Persistence(_) => ErrorKind::StoreFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atm_core::TransactionKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_error() {
        let err = BusinessError::insufficient_funds(dec!(100), dec!(50));
        assert!(err.to_string().contains("required 100"));
        assert!(err.to_string().contains("available 50"));
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            BusinessError::TargetNotFound(AccountId(2)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            BusinessError::NameTaken("alice".to_string()).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            BusinessError::SelfTransfer(AccountId(1)).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            BusinessError::from(CoreError::SessionExpired("1".to_string())).kind(),
            ErrorKind::SessionExpired
        );
        assert_eq!(
            BusinessError::from(PersistenceError::Configuration("x".to_string())).kind(),
            ErrorKind::StoreFailure
        );
    }

    #[test]
    fn test_no_history_message() {
        let err = BusinessError::NoHistory {
            account_id: AccountId(4),
            filter: HistoryFilter::Only(TransactionKind::Withdraw),
        };
        assert_eq!(err.to_string(), "No withdraw history for account 4");
    }
}
