//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod category;
pub mod planned;
pub mod recurring;
pub mod report;
pub mod transaction;
pub mod transfer;

pub use account::{handle_account_command, AccountCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use planned::{handle_planned_command, PlannedCommands};
pub use recurring::{handle_recurring_command, RecurringCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
pub use transfer::{handle_transfer_command, TransferCommands};

use chrono::NaiveDate;

use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Money};
use crate::services::AccountService;
use crate::storage::Storage;

/// Parse a decimal amount such as `12.50`
pub fn parse_amount(input: &str) -> LedgerResult<Money> {
    Money::parse(input).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount '{}': {}. Use a format like '12.50' or '12'",
            input, e
        ))
    })
}

/// Parse a date as `YYYY-MM-DD`, or in the configured date format
pub fn parse_date(input: &str, settings: &Settings) -> LedgerResult<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, &settings.date_format))
        .map_err(|_| {
            LedgerError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD",
                input
            ))
        })
}

/// Resolve an account by name or ID, failing if it does not exist
pub fn resolve_account(storage: &Storage, identifier: &str) -> LedgerResult<Account> {
    AccountService::new(storage)
        .find(identifier)?
        .ok_or_else(|| LedgerError::account_not_found(identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap(), Money::from_cents(1250));
        assert!(matches!(
            parse_amount("twelve"),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let mut settings = Settings::default();
        settings.date_format = "%d.%m.%Y".to_string();

        let expected = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(parse_date("2025-03-05", &settings).unwrap(), expected);
        assert_eq!(parse_date("05.03.2025", &settings).unwrap(), expected);
        assert!(parse_date("March 5th", &settings).is_err());
    }
}
