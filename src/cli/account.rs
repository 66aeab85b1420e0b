//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use super::{parse_amount, resolve_account};
use crate::config::Settings;
use crate::display::account::{format_account_details, format_account_list, format_balance_checks};
use crate::error::{LedgerError, LedgerResult};
use crate::models::AccountType;
use crate::services::AccountService;
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (cash, debit, credit, savings, investment, other)
        #[arg(short = 't', long, default_value = "cash")]
        account_type: String,
        /// Initial balance (e.g., "1000.00" or "1000")
        #[arg(short, long, default_value = "0")]
        balance: String,
    },
    /// List all accounts with the total balance
    List,
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Rename or retype an account
    Edit {
        /// Account name or ID
        account: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New account type
        #[arg(short = 't', long)]
        account_type: Option<String>,
    },
    /// Delete an account that has no transactions
    Delete {
        /// Account name or ID
        account: String,
    },
    /// Recompute balances from the ledger and compare with stored balances
    Check,
}

fn parse_account_type(input: &str) -> LedgerResult<AccountType> {
    AccountType::parse(input).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid account type: '{}'. Valid types: cash, debit, credit, savings, investment, other",
            input
        ))
    })
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let service = AccountService::new(storage);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            balance,
        } => {
            let account_type = parse_account_type(&account_type)?;
            let initial = parse_amount(&balance)?;
            let account = service.create(&name, account_type, initial)?;

            println!("Created account: {}", account.name);
            println!("  Type: {}", account.account_type);
            println!("  Balance: {}", account.balance.format_with_symbol(currency));
            println!("  ID: {}", account.id);
        }

        AccountCommands::List => {
            let accounts = service.list()?;
            print!("{}", format_account_list(&accounts, currency));
            if !accounts.is_empty() {
                println!();
            }
        }

        AccountCommands::Show { account } => {
            let found = resolve_account(storage, &account)?;
            let references = service.references(found.id)?;
            print!("{}", format_account_details(&found, &references, currency));
        }

        AccountCommands::Edit {
            account,
            name,
            account_type,
        } => {
            let found = resolve_account(storage, &account)?;

            if name.is_none() && account_type.is_none() {
                println!("No changes specified. Use --name or --account-type.");
                return Ok(());
            }

            let account_type = account_type.as_deref().map(parse_account_type).transpose()?;
            let updated = service.update(found.id, name.as_deref(), account_type)?;
            println!("Updated account: {} ({})", updated.name, updated.account_type);
        }

        AccountCommands::Delete { account } => {
            let found = resolve_account(storage, &account)?;
            let references = service.references(found.id)?;
            let deleted = service.delete(found.id)?;

            println!("Deleted account: {}", deleted.name);
            if references.has_dangling() {
                println!(
                    "  Note: {} transfer(s), {} recurring and {} planned payment(s) still refer to it",
                    references.transfers, references.recurring, references.planned
                );
            }
        }

        AccountCommands::Check => {
            let checks = service.verify_balances()?;
            print!("{}", format_balance_checks(&checks));
            if !checks.is_empty() {
                println!();
            }

            let broken = checks.iter().filter(|c| !c.is_consistent()).count();
            if broken > 0 {
                return Err(LedgerError::Storage(format!(
                    "{} account(s) have a stored balance that differs from their history",
                    broken
                )));
            }
        }
    }

    Ok(())
}
