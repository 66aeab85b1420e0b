//! Planned payment CLI commands

use clap::Subcommand;

use super::{parse_amount, parse_date, resolve_account};
use crate::config::Settings;
use crate::display::{account_names, format_planned_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::PlannedPaymentId;
use crate::services::{AccountService, PlannedEdit, PlannedFilter, PlannedInput, PlannedService};
use crate::storage::Storage;

/// Planned payment subcommands
#[derive(Subcommand)]
pub enum PlannedCommands {
    /// Schedule a one-off expense
    Add {
        /// Account name or ID
        account: String,
        /// Amount
        amount: String,
        /// Planned date (YYYY-MM-DD)
        date: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Category name
        #[arg(short, long, default_value = "")]
        category: String,
    },
    /// List planned payments in date order
    List {
        /// Include completed payments
        #[arg(short, long)]
        all: bool,
        /// Only payments due on or before this date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Change a pending planned payment
    Edit {
        /// Planned payment ID
        id: String,
        /// Move to another account
        #[arg(short, long)]
        account: Option<String>,
        /// New amount
        #[arg(long)]
        amount: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Pay a planned payment now
    Execute {
        /// Planned payment ID
        id: String,
    },
    /// Delete a planned payment
    Delete {
        /// Planned payment ID
        id: String,
    },
}

fn parse_id(input: &str) -> LedgerResult<PlannedPaymentId> {
    input
        .parse()
        .map_err(|_| LedgerError::planned_not_found(input))
}

/// Handle a planned payment command
pub fn handle_planned_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PlannedCommands,
) -> LedgerResult<()> {
    let service = PlannedService::new(storage);

    match cmd {
        PlannedCommands::Add {
            account,
            amount,
            date,
            description,
            category,
        } => {
            let account = resolve_account(storage, &account)?;
            let payment = service.create(
                PlannedInput::new(account.id, parse_amount(&amount)?, parse_date(&date, settings)?)
                    .description(description)
                    .category(category),
            )?;
            println!(
                "Planned {} from {} on {} ({})",
                payment.amount.format_with_symbol(&settings.currency_symbol),
                account.name,
                payment.planned_date,
                payment.id
            );
        }

        PlannedCommands::List { all, due } => {
            let mut filter = if all {
                PlannedFilter::all()
            } else {
                PlannedFilter::pending()
            };
            if let Some(due) = due {
                filter = filter.due_by(parse_date(&due, settings)?);
            }

            let payments = service.list(filter)?;
            let names = account_names(&AccountService::new(storage).list()?);
            print!("{}", format_planned_list(&payments, &names));
        }

        PlannedCommands::Edit {
            id,
            account,
            amount,
            date,
            description,
            category,
        } => {
            let id = parse_id(&id)?;
            let mut edit = PlannedEdit::new();
            if let Some(account) = account {
                edit = edit.account(resolve_account(storage, &account)?.id);
            }
            if let Some(amount) = amount {
                edit = edit.amount(parse_amount(&amount)?);
            }
            if let Some(date) = date {
                edit = edit.date(parse_date(&date, settings)?);
            }
            if let Some(description) = description {
                edit = edit.description(description);
            }
            if let Some(category) = category {
                edit = edit.category(category);
            }

            let payment = service.edit(id, edit)?;
            println!("Updated planned payment {}", payment.id);
        }

        PlannedCommands::Execute { id } => {
            let txn = service.execute(parse_id(&id)?)?;
            println!("Executed planned payment {}: {} ({})", id, txn.amount, txn.id);
        }

        PlannedCommands::Delete { id } => {
            let payment = service.delete(parse_id(&id)?)?;
            println!("Deleted planned payment {}", payment.id);
        }
    }

    Ok(())
}
