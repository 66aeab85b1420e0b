//! Account model
//!
//! Represents a place money is held (wallet, debit card, savings, ...).
//! The balance is owned by the ledger: it only moves through transactions
//! and transfers, never through an account edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;
use super::money::Money;
use crate::error::LedgerError;

/// Type of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Cash/wallet
    #[default]
    Cash,
    /// Debit card or current account
    Debit,
    /// Credit card
    Credit,
    /// Savings account
    Savings,
    /// Brokerage or other investment account
    Investment,
    /// Other account type
    Other,
}

impl AccountType {
    /// All account types, in display order
    pub const ALL: [AccountType; 6] = [
        Self::Cash,
        Self::Debit,
        Self::Credit,
        Self::Savings,
        Self::Investment,
        Self::Other,
    ];

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "wallet" => Some(Self::Cash),
            "debit" | "debit_card" | "card" => Some(Self::Debit),
            "credit" | "credit_card" | "creditcard" => Some(Self::Credit),
            "savings" | "deposit" => Some(Self::Savings),
            "investment" | "investments" => Some(Self::Investment),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cash => "Cash",
            Self::Debit => "Debit Card",
            Self::Credit => "Credit Card",
            Self::Savings => "Savings",
            Self::Investment => "Investment",
            Self::Other => "Other",
        };
        f.pad(label)
    }
}

/// A money-holding account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,

    /// Account name, unique case-insensitively
    pub name: String,

    /// Current balance; always the net of the account's ledger history
    pub balance: Money,

    /// Type of account
    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(id: AccountId, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id,
            name: name.into().trim().to_string(),
            balance: Money::zero(),
            account_type,
            created_at: Utc::now(),
        }
    }

    /// Key used for the case-insensitive name uniqueness check
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        let chars = self.name.chars().count();
        if chars > 100 {
            return Err(AccountValidationError::NameTooLong(chars));
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

impl From<AccountValidationError> for LedgerError {
    fn from(err: AccountValidationError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let account = Account::new(AccountId::new(1), "  Wallet ", AccountType::Cash);
        assert_eq!(account.name, "Wallet");
        assert_eq!(account.account_type, AccountType::Cash);
        assert_eq!(account.balance, Money::zero());
    }

    #[test]
    fn test_validation() {
        let mut account = Account::new(AccountId::new(1), "Valid Name", AccountType::Debit);
        assert!(account.validate().is_ok());

        account.name = String::new();
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyName));

        account.name = "a".repeat(101);
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::NameTooLong(_))
        ));
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!(AccountType::parse("cash"), Some(AccountType::Cash));
        assert_eq!(AccountType::parse("DEBIT"), Some(AccountType::Debit));
        assert_eq!(AccountType::parse("credit_card"), Some(AccountType::Credit));
        assert_eq!(AccountType::parse("invalid"), None);
    }

    #[test]
    fn test_serialization_uses_type_column() {
        let account = Account::new(AccountId::new(4), "Card", AccountType::Debit);
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["type"], "debit");
        assert_eq!(json["id"], 4);

        let deserialized: Account = serde_json::from_value(json).unwrap();
        assert_eq!(account, deserialized);
    }

    #[test]
    fn test_display() {
        let account = Account::new(AccountId::new(1), "My Card", AccountType::Debit);
        assert_eq!(format!("{}", account), "My Card (Debit Card)");
    }
}
