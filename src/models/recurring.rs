//! Recurring payment model
//!
//! A recurring payment is a standing monthly expense on one account. It fires
//! on its payment day and at most once per calendar month; `last_processed`
//! records the date of the last successful firing.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, RecurringPaymentId};
use super::money::Money;
use crate::error::LedgerError;

/// A monthly recurring expense definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: RecurringPaymentId,
    pub account_id: AccountId,
    /// Unsigned amount charged on each firing
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Day of the month (1-31). Days past the end of a short month never fire.
    pub payment_day: u32,
    pub active: bool,
    pub last_processed: Option<NaiveDate>,
}

impl RecurringPayment {
    /// Create an active definition that has never fired
    pub fn new(
        id: RecurringPaymentId,
        account_id: AccountId,
        amount: Money,
        description: impl Into<String>,
        category: impl Into<String>,
        payment_day: u32,
    ) -> Self {
        Self {
            id,
            account_id,
            amount,
            description: description.into(),
            category: category.into(),
            payment_day,
            active: true,
            last_processed: None,
        }
    }

    /// Whether this definition already fired in the calendar month of `date`
    pub fn processed_in_month_of(&self, date: NaiveDate) -> bool {
        self.last_processed
            .map(|last| last.year() == date.year() && last.month() == date.month())
            .unwrap_or(false)
    }

    /// Whether this definition should fire on `today`
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        self.active && self.payment_day == today.day() && !self.processed_in_month_of(today)
    }

    /// Validate the definition
    pub fn validate(&self) -> Result<(), RecurringValidationError> {
        if !self.amount.is_positive() {
            return Err(RecurringValidationError::NonPositiveAmount(self.amount));
        }

        if !(1..=31).contains(&self.payment_day) {
            return Err(RecurringValidationError::DayOutOfRange(self.payment_day));
        }

        Ok(())
    }
}

/// Validation errors for recurring payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurringValidationError {
    NonPositiveAmount(Money),
    DayOutOfRange(u32),
}

impl fmt::Display for RecurringValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Recurring amount must be positive, got {}", amount)
            }
            Self::DayOutOfRange(day) => {
                write!(f, "Payment day must be between 1 and 31, got {}", day)
            }
        }
    }
}

impl std::error::Error for RecurringValidationError {}

impl From<RecurringValidationError> for LedgerError {
    fn from(err: RecurringValidationError) -> Self {
        LedgerError::InvalidRange(err.to_string())
    }
}
