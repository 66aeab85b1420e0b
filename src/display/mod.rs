//! Display formatting for terminal output
//!
//! Provides utilities for formatting ledger rows and reports as plain-text
//! tables.

pub mod account;
pub mod category;
pub mod report;
pub mod schedule;
pub mod transaction;

pub use account::{format_account_details, format_account_list, format_balance_checks};
pub use category::format_category_list;
pub use schedule::{format_planned_list, format_recurring_list, format_recurring_outcomes};
pub use transaction::{
    format_transaction_details, format_transaction_register, format_transfer_list,
};

use std::collections::HashMap;

use crate::models::{Account, AccountId};

/// Account names by id, for resolving references in tables
pub type AccountNames = HashMap<AccountId, String>;

/// Build the name lookup from a list of accounts
pub fn account_names(accounts: &[Account]) -> AccountNames {
    accounts.iter().map(|a| (a.id, a.name.clone())).collect()
}

/// Name of an account, or a marker if it no longer exists
pub fn account_name(names: &AccountNames, id: AccountId) -> &str {
    names.get(&id).map(String::as_str).unwrap_or("(unknown)")
}
