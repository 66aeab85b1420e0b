//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use crate::models::{Account, Money};
use crate::services::{AccountReferences, BalanceCheck};

/// Format a list of accounts with balances as a table
pub fn format_account_list(accounts: &[Account], currency: &str) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }

    // Calculate column widths
    let name_width = accounts
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let type_width = accounts
        .iter()
        .map(|a| a.account_type.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<name_width$}  {:<type_width$}  {:>14}\n",
        "ID",
        "Name",
        "Type",
        "Balance",
        name_width = name_width,
        type_width = type_width,
    ));

    let rule = format!(
        "{:-<8}  {:-<name_width$}  {:-<type_width$}  {:->14}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
        type_width = type_width,
    );
    output.push_str(&rule);

    for account in accounts {
        output.push_str(&format!(
            "{:<8}  {:<name_width$}  {:<type_width$}  {:>14}\n",
            account.id.to_string(),
            account.name,
            account.account_type,
            account.balance.to_string(),
            name_width = name_width,
            type_width = type_width,
        ));
    }

    let total: Money = accounts.iter().map(|a| a.balance).sum();
    output.push_str(&rule);
    output.push_str(&format!(
        "{:<8}  {:<name_width$}  {:<type_width$}  {:>14}\n",
        "TOTAL",
        "",
        "",
        total.format_with_symbol(currency),
        name_width = name_width,
        type_width = type_width,
    ));

    output
}

/// Format a single account's details
pub fn format_account_details(
    account: &Account,
    references: &AccountReferences,
    currency: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  ID:             {}\n", account.id));
    output.push_str(&format!("  Type:           {}\n", account.account_type));
    output.push_str(&format!(
        "  Balance:        {}\n",
        account.balance.format_with_symbol(currency)
    ));
    output.push_str(&format!(
        "  Created:        {}\n",
        account.created_at.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!("  Transactions:   {}\n", references.transactions));
    output.push_str(&format!("  Transfers:      {}\n", references.transfers));
    output.push_str(&format!("  Recurring:      {}\n", references.recurring));
    output.push_str(&format!("  Planned:        {}\n", references.planned));

    output
}

/// Format the result of a balance verification
pub fn format_balance_checks(checks: &[BalanceCheck]) -> String {
    if checks.is_empty() {
        return "No accounts found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<24} {:>14} {:>14}  {}\n",
        "Account", "Stored", "Derived", "Status"
    ));
    output.push_str(&"-".repeat(64));
    output.push('\n');

    for check in checks {
        output.push_str(&format!(
            "{:<24} {:>14} {:>14}  {}\n",
            check.name,
            check.stored,
            check.derived,
            if check.is_consistent() { "ok" } else { "MISMATCH" }
        ));
    }

    output
}
