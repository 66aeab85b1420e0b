//! Transaction model
//!
//! A transaction is a single income or expense entry on one account. The
//! stored amount is signed (positive for income, negative for expense) and
//! the type tag always agrees with the sign.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, TransactionId};
use super::money::Money;
use crate::error::LedgerError;

/// Kind of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming into the account
    Income,
    /// Money leaving the account
    Expense,
}

impl TransactionType {
    /// Apply this type's sign to an unsigned amount
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            Self::Income => amount.abs(),
            Self::Expense => -amount.abs(),
        }
    }

    /// Derive the type from a signed amount
    pub fn from_signed(amount: Money) -> Self {
        if amount.is_negative() {
            Self::Expense
        } else {
            Self::Income
        }
    }

    /// Parse a transaction type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Some(Self::Income),
            "expense" | "out" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.pad("income"),
            Self::Expense => f.pad("expense"),
        }
    }
}

/// A ledger entry on a single account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// The account this transaction belongs to
    pub account_id: AccountId,

    /// Signed amount (positive for income, negative for expense)
    pub amount: Money,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Category name (a weak reference into the vocabulary)
    #[serde(default)]
    pub category: String,

    /// When the money moved
    pub transaction_date: NaiveDateTime,

    /// Income or expense; agrees with the sign of `amount`
    pub transaction_type: TransactionType,
}

impl Transaction {
    /// Create a transaction of the given type from an unsigned amount
    pub fn new(
        id: TransactionId,
        account_id: AccountId,
        transaction_type: TransactionType,
        amount: Money,
        transaction_date: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            account_id,
            amount: transaction_type.signed(amount),
            description: String::new(),
            category: String::new(),
            transaction_date,
            transaction_type,
        }
    }

    /// Check if this is an income entry
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    /// Check if this is an expense entry
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount.is_zero() {
            return Err(TransactionValidationError::ZeroAmount);
        }

        if TransactionType::from_signed(self.amount) != self.transaction_type {
            return Err(TransactionValidationError::SignMismatch {
                amount: self.amount,
                transaction_type: self.transaction_type,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.transaction_date.format("%Y-%m-%d"),
            self.amount,
            self.description
        )
    }
}

/// Current local time, truncated to whole seconds
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    ZeroAmount,
    SignMismatch {
        amount: Money,
        transaction_type: TransactionType,
    },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAmount => write!(f, "Transaction amount cannot be zero"),
            Self::SignMismatch {
                amount,
                transaction_type,
            } => write!(
                f,
                "Amount {} does not match transaction type {}",
                amount, transaction_type
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

impl From<TransactionValidationError> for LedgerError {
    fn from(err: TransactionValidationError) -> Self {
        match err {
            TransactionValidationError::ZeroAmount => LedgerError::InvalidRange(err.to_string()),
            TransactionValidationError::SignMismatch { .. } => {
                LedgerError::Validation(err.to_string())
            }
        }
    }
}

/// Result of re-deriving an edited transaction's effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correction {
    /// The new signed amount to store on the transaction
    pub amount: Money,
    /// The account balance after the edit
    pub balance: Money,
}

/// Why a correction was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionError {
    /// The new unsigned amount was zero or negative
    NonPositiveAmount(Money),
    /// The account could not have afforded the new expense amount
    InsufficientFunds { needed: Money, available: Money },
    /// The resulting balance does not fit in a `Money`
    BalanceOverflow,
}

/// Re-derive the effect of changing a transaction's amount.
///
/// `old_signed` is the stored amount, `new_amount` the requested unsigned
/// amount and `balance` the account's current balance. The type (taken from
/// the sign of `old_signed`) never changes. An expense is re-checked against
/// the balance as it was before the original expense; an income edit may
/// drive the balance negative.
pub fn apply_correction(
    old_signed: Money,
    new_amount: Money,
    balance: Money,
) -> Result<Correction, CorrectionError> {
    if !new_amount.is_positive() {
        return Err(CorrectionError::NonPositiveAmount(new_amount));
    }

    let new_signed = TransactionType::from_signed(old_signed).signed(new_amount);

    if old_signed.is_negative() {
        let before_original = balance
            .checked_sub(old_signed)
            .ok_or(CorrectionError::BalanceOverflow)?;
        if before_original < new_amount {
            return Err(CorrectionError::InsufficientFunds {
                needed: new_amount,
                available: before_original,
            });
        }
    }

    let balance = new_signed
        .checked_sub(old_signed)
        .and_then(|delta| balance.checked_add(delta))
        .ok_or(CorrectionError::BalanceOverflow)?;

    Ok(Correction {
        amount: new_signed,
        balance,
    })
}
