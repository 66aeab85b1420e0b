//! Planned payment model
//!
//! A one-off expense scheduled for a date. It moves from pending to completed
//! exactly once, when it is executed; completed payments stay as history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, PlannedPaymentId};
use super::money::Money;
use crate::error::LedgerError;

/// A scheduled one-off expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedPayment {
    pub id: PlannedPaymentId,
    pub account_id: AccountId,
    /// Unsigned amount to charge on execution
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub planned_date: NaiveDate,
    /// Monotonic: false until executed, then true forever
    pub completed: bool,
}

impl PlannedPayment {
    /// Create a pending planned payment
    pub fn new(
        id: PlannedPaymentId,
        account_id: AccountId,
        amount: Money,
        description: impl Into<String>,
        category: impl Into<String>,
        planned_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            account_id,
            amount,
            description: description.into(),
            category: category.into(),
            planned_date,
            completed: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Pending and scheduled on or before `date`
    pub fn is_due_by(&self, date: NaiveDate) -> bool {
        self.is_pending() && self.planned_date <= date
    }

    /// Validate the planned payment
    pub fn validate(&self) -> Result<(), PlannedValidationError> {
        if !self.amount.is_positive() {
            return Err(PlannedValidationError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

/// Validation errors for planned payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedValidationError {
    NonPositiveAmount(Money),
}

impl fmt::Display for PlannedValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Planned amount must be positive, got {}", amount)
            }
        }
    }
}

impl std::error::Error for PlannedValidationError {}

impl From<PlannedValidationError> for LedgerError {
    fn from(err: PlannedValidationError) -> Self {
        LedgerError::InvalidRange(err.to_string())
    }
}
