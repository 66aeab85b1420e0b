//! Transaction CLI commands
//!
//! Implements CLI commands for recording and correcting income and expenses.

use clap::{Args, Subcommand};

use super::{parse_amount, parse_date, resolve_account};
use crate::config::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_register};
use crate::display::account_names;
use crate::error::{LedgerError, LedgerResult};
use crate::models::transaction::local_now;
use crate::models::{CategoryKind, Transaction, TransactionType};
use crate::services::{
    AccountService, CategoryService, EntryInput, TransactionEdit, TransactionFilter,
    TransactionService,
};
use crate::storage::Storage;

/// Arguments shared by `income` and `expense`
#[derive(Args)]
pub struct EntryArgs {
    /// Account name or ID
    account: String,
    /// Amount (e.g., "12.50")
    amount: String,
    /// Category name
    #[arg(short, long)]
    category: Option<String>,
    /// Description
    #[arg(short, long)]
    description: Option<String>,
    /// Date (YYYY-MM-DD), defaults to now
    #[arg(long)]
    date: Option<String>,
}

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record money coming into an account
    Income(EntryArgs),
    /// Record money leaving an account
    Expense(EntryArgs),
    /// List transactions, newest first
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by type (income, expense)
        #[arg(short = 't', long = "type")]
        transaction_type: Option<String>,
        /// Filter by category name
        #[arg(short, long)]
        category: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID
        id: String,
    },
    /// Correct a transaction's amount, description or category
    Edit {
        /// Transaction ID
        id: String,
        /// New amount (unsigned; the type never changes)
        #[arg(short, long)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a transaction and reverse its effect on the balance
    Delete {
        /// Transaction ID
        id: String,
    },
}

fn find_transaction(service: &TransactionService<'_>, id: &str) -> LedgerResult<Transaction> {
    service
        .find(id)?
        .ok_or_else(|| LedgerError::transaction_not_found(id))
}

fn record(
    storage: &Storage,
    settings: &Settings,
    kind: TransactionType,
    args: EntryArgs,
) -> LedgerResult<()> {
    let EntryArgs {
        account,
        amount,
        category,
        description,
        date,
    } = args;

    let account = resolve_account(storage, &account)?;
    let mut input = EntryInput::new(account.id, parse_amount(&amount)?);
    if let Some(category) = &category {
        input = input.category(category.clone());
    }
    if let Some(description) = description {
        input = input.description(description);
    }
    if let Some(date) = date {
        input = input.at(parse_date(&date, settings)?.and_time(local_now().time()));
    }

    let service = TransactionService::new(storage);
    let txn = match kind {
        TransactionType::Income => service.record_income(input)?,
        TransactionType::Expense => service.record_expense(input)?,
    };

    println!("Recorded {}: {} ({})", kind, txn.amount, txn.id);
    let balance = AccountService::new(storage)
        .get(account.id)?
        .map(|a| a.balance)
        .unwrap_or(account.balance);
    println!(
        "  {} balance: {}",
        account.name,
        balance.format_with_symbol(&settings.currency_symbol)
    );

    if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
        let kind = CategoryKind::from(kind);
        if CategoryService::new(storage).get_by_name(kind, &category)?.is_none() {
            println!("  Note: '{}' is not one of your {} categories", category.trim(), kind);
        }
    }

    Ok(())
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service = TransactionService::new(storage);

    match cmd {
        TransactionCommands::Income(args) => {
            record(storage, settings, TransactionType::Income, args)?
        }
        TransactionCommands::Expense(args) => {
            record(storage, settings, TransactionType::Expense, args)?
        }

        TransactionCommands::List {
            account,
            transaction_type,
            category,
            from,
            to,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(account) = account {
                filter = filter.account(resolve_account(storage, &account)?.id);
            }
            if let Some(kind) = transaction_type {
                let kind = TransactionType::parse(&kind).ok_or_else(|| {
                    LedgerError::Validation(format!(
                        "Invalid transaction type: '{}'. Use income or expense",
                        kind
                    ))
                })?;
                filter = filter.transaction_type(kind);
            }
            if let Some(category) = category {
                filter = filter.category(category);
            }
            filter.start_date = from.map(|d| parse_date(&d, settings)).transpose()?;
            filter.end_date = to.map(|d| parse_date(&d, settings)).transpose()?;

            let transactions = service.list(filter)?;
            let names = account_names(&AccountService::new(storage).list()?);
            print!("{}", format_transaction_register(&transactions, &names));
        }

        TransactionCommands::Show { id } => {
            let txn = find_transaction(&service, &id)?;
            let names = account_names(&AccountService::new(storage).list()?);
            print!("{}", format_transaction_details(&txn, &names));
        }

        TransactionCommands::Edit {
            id,
            amount,
            category,
            description,
        } => {
            let txn = find_transaction(&service, &id)?;

            let mut edit = TransactionEdit::new();
            if let Some(amount) = amount {
                edit = edit.amount(parse_amount(&amount)?);
            }
            if let Some(category) = category {
                edit = edit.category(category);
            }
            if let Some(description) = description {
                edit = edit.description(description);
            }

            let updated = service.edit(txn.id, edit)?;
            println!("Updated transaction {}: {}", updated.id, updated.amount);
        }

        TransactionCommands::Delete { id } => {
            let txn = find_transaction(&service, &id)?;
            let deleted = service.delete(txn.id)?;
            println!("Deleted transaction {} ({})", deleted.id, deleted.amount);
        }
    }

    Ok(())
}
