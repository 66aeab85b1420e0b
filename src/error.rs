//! Custom error types for Pocketbook
//!
//! This module defines the error hierarchy for the ledger using thiserror.
//! Every ledger-mutating operation returns one of these kinds; none of them
//! leave the store partially updated.

use thiserror::Error;

use crate::models::Money;

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Unique-name constraint violations (accounts, categories)
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Transfer whose source and destination are the same account
    #[error("Cannot transfer to the same account: {0}")]
    SameAccount(String),

    /// Attempted debit exceeds the account balance
    #[error("Insufficient funds in account '{account}': need {needed}, have {available}")]
    InsufficientFunds {
        account: String,
        needed: Money,
        available: Money,
    },

    /// Mutating or executing a planned payment that already completed
    #[error("Planned payment already completed: {0}")]
    AlreadyCompleted(String),

    /// Deleting an account that still owns transactions
    #[error("Account '{account}' has {count} transaction(s) and cannot be deleted")]
    HasTransactions { account: String, count: usize },

    /// Out-of-range input (payment day outside 1-31, non-positive amount)
    #[error("Value out of range: {0}")]
    InvalidRange(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transfers
    pub fn transfer_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transfer",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for recurring payments
    pub fn recurring_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Recurring payment",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for planned payments
    pub fn planned_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Planned payment",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an insufficient-funds error
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidRange(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::account_not_found("Wallet");
        assert_eq!(err.to_string(), "Account not found: Wallet");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_insufficient_funds_error() {
        let err = LedgerError::InsufficientFunds {
            account: "Wallet".into(),
            needed: Money::from_cents(100000),
            available: Money::from_cents(70000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds in account 'Wallet': need 1000.00, have 700.00"
        );
        assert!(err.is_insufficient_funds());
    }

    #[test]
    fn test_has_transactions_error() {
        let err = LedgerError::HasTransactions {
            account: "Wallet".into(),
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Account 'Wallet' has 2 transaction(s) and cannot be deleted"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ledger_err: LedgerError = io_err.into();
        assert!(matches!(ledger_err, LedgerError::Io(_)));
    }
}
