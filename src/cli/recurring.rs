//! Recurring payment CLI commands

use chrono::Local;
use clap::Subcommand;

use super::{parse_amount, parse_date, resolve_account};
use crate::config::Settings;
use crate::display::{format_recurring_list, format_recurring_outcomes};
use crate::error::{LedgerError, LedgerResult};
use crate::models::RecurringPaymentId;
use crate::services::{RecurringInput, RecurringService, RecurringUpdate};
use crate::storage::Storage;

/// Recurring payment subcommands
#[derive(Subcommand)]
pub enum RecurringCommands {
    /// Add a monthly recurring expense
    Add {
        /// Account name or ID
        account: String,
        /// Amount charged each month
        amount: String,
        /// Day of the month (1-31)
        #[arg(short = 'D', long)]
        day: u32,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Category name
        #[arg(short, long, default_value = "")]
        category: String,
    },
    /// List recurring payments
    List,
    /// Change a recurring payment
    Edit {
        /// Recurring payment ID
        id: String,
        /// Move to another account
        #[arg(short, long)]
        account: Option<String>,
        /// New amount
        #[arg(long)]
        amount: Option<String>,
        /// New day of the month (1-31)
        #[arg(short = 'D', long)]
        day: Option<u32>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Resume a paused recurring payment
    Enable {
        /// Recurring payment ID
        id: String,
    },
    /// Pause a recurring payment
    Disable {
        /// Recurring payment ID
        id: String,
    },
    /// Delete a recurring payment
    Delete {
        /// Recurring payment ID
        id: String,
    },
    /// Fire every recurring payment due today
    Process {
        /// Process as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<String>,
    },
}

fn parse_id(input: &str) -> LedgerResult<RecurringPaymentId> {
    input
        .parse()
        .map_err(|_| LedgerError::recurring_not_found(input))
}

/// Handle a recurring payment command
pub fn handle_recurring_command(
    storage: &Storage,
    settings: &Settings,
    cmd: RecurringCommands,
) -> LedgerResult<()> {
    let service = RecurringService::new(storage);

    match cmd {
        RecurringCommands::Add {
            account,
            amount,
            day,
            description,
            category,
        } => {
            let account = resolve_account(storage, &account)?;
            let payment = service.create(
                RecurringInput::new(account.id, parse_amount(&amount)?, day)
                    .description(description)
                    .category(category),
            )?;
            println!(
                "Created recurring payment {}: {} on day {} from {}",
                payment.id,
                payment.amount.format_with_symbol(&settings.currency_symbol),
                payment.payment_day,
                account.name
            );
            if payment.payment_day > 28 {
                println!("  Note: day {} is skipped in months that are shorter", payment.payment_day);
            }
        }

        RecurringCommands::List => {
            print!("{}", format_recurring_list(&service.list()?));
        }

        RecurringCommands::Edit {
            id,
            account,
            amount,
            day,
            description,
            category,
        } => {
            let id = parse_id(&id)?;
            let mut update = RecurringUpdate::new();
            if let Some(account) = account {
                update = update.account(resolve_account(storage, &account)?.id);
            }
            if let Some(amount) = amount {
                update = update.amount(parse_amount(&amount)?);
            }
            if let Some(day) = day {
                update = update.payment_day(day);
            }
            if let Some(description) = description {
                update = update.description(description);
            }
            if let Some(category) = category {
                update = update.category(category);
            }

            let payment = service.update(id, update)?;
            println!("Updated recurring payment {}", payment.id);
        }

        RecurringCommands::Enable { id } => {
            let payment = service.set_active(parse_id(&id)?, true)?;
            println!("Enabled recurring payment {}", payment.id);
        }

        RecurringCommands::Disable { id } => {
            let payment = service.set_active(parse_id(&id)?, false)?;
            println!("Disabled recurring payment {}", payment.id);
        }

        RecurringCommands::Delete { id } => {
            let payment = service.delete(parse_id(&id)?)?;
            println!("Deleted recurring payment {}", payment.id);
        }

        RecurringCommands::Process { date } => {
            let today = match date {
                Some(date) => parse_date(&date, settings)?,
                None => Local::now().date_naive(),
            };
            let outcomes = service.process_due(today)?;
            print!("{}", format_recurring_outcomes(&outcomes));
        }
    }

    Ok(())
}
