//! Transaction and transfer display formatting
//!
//! Register views for income/expense entries and for transfers.

use super::report::{category_label, truncate};
use super::{account_name, AccountNames};
use crate::models::{Transaction, Transfer};

/// Format a single transaction for display (register row)
pub fn format_transaction_row(txn: &Transaction, names: &AccountNames) -> String {
    format!(
        "{:<9} {} {:<16} {:<8} {:>12}  {:<18} {}",
        txn.id.to_string(),
        txn.transaction_date.format("%Y-%m-%d %H:%M"),
        truncate(account_name(names, txn.account_id), 16),
        txn.transaction_type,
        txn.amount,
        truncate(category_label(&txn.category), 18),
        txn.description
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(transactions: &[Transaction], names: &AccountNames) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<9} {:<16} {:<16} {:<8} {:>12}  {:<18} {}\n",
        "ID", "Date", "Account", "Type", "Amount", "Category", "Description"
    ));
    output.push_str(&"-".repeat(100));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, names));
        output.push('\n');
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, names: &AccountNames) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!(
        "Date:        {}\n",
        txn.transaction_date.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!("Account:     {}\n", account_name(names, txn.account_id)));
    output.push_str(&format!("Type:        {}\n", txn.transaction_type));
    output.push_str(&format!("Amount:      {}\n", txn.amount));
    output.push_str(&format!("Category:    {}\n", category_label(&txn.category)));

    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }

    output
}

/// Format a list of transfers
pub fn format_transfer_list(transfers: &[Transfer], names: &AccountNames) -> String {
    if transfers.is_empty() {
        return "No transfers found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<9} {:<16} {:<16}   {:<16} {:>12}  {}\n",
        "ID", "Date", "From", "To", "Amount", "Description"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for transfer in transfers {
        output.push_str(&format!(
            "{:<9} {} {:<16} → {:<16} {:>12}  {}\n",
            transfer.id.to_string(),
            transfer.transfer_date.format("%Y-%m-%d %H:%M"),
            truncate(account_name(names, transfer.from_account_id), 16),
            truncate(account_name(names, transfer.to_account_id), 16),
            transfer.amount,
            transfer.description
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, Money, TransactionId, TransactionType, TransferId};
    use chrono::NaiveDate;

    fn noon() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn names() -> AccountNames {
        let mut names = AccountNames::new();
        names.insert(AccountId::new(1), "Wallet".to_string());
        names
    }

    #[test]
    fn test_format_transaction_row() {
        let mut txn = Transaction::new(
            TransactionId::new(3),
            AccountId::new(1),
            TransactionType::Expense,
            Money::from_cents(5000),
            noon(),
        );
        txn.description = "Lunch".into();

        let row = format_transaction_row(&txn, &names());
        assert!(row.contains("txn-3"));
        assert!(row.contains("2025-01-15 12:00"));
        assert!(row.contains("Wallet"));
        assert!(row.contains("-50.00"));
        assert!(row.contains("(uncategorized)"));
        assert!(row.contains("Lunch"));
    }

    #[test]
    fn test_empty_register() {
        assert_eq!(
            format_transaction_register(&[], &names()),
            "No transactions found.\n"
        );
    }

    #[test]
    fn test_transfer_list_shows_unknown_accounts() {
        let transfer = Transfer {
            id: TransferId::new(1),
            from_account_id: AccountId::new(1),
            to_account_id: AccountId::new(9),
            amount: Money::from_major(300),
            description: String::new(),
            transfer_date: noon(),
        };
        let output = format_transfer_list(&[transfer], &names());
        assert!(output.contains("Wallet"));
        assert!(output.contains("(unknown)"));
        assert!(output.contains("300.00"));
    }
}
