//! Transfer CLI commands

use clap::Subcommand;

use super::{parse_amount, parse_date, resolve_account};
use crate::config::Settings;
use crate::display::{account_names, format_transfer_list};
use crate::error::LedgerResult;
use crate::models::transaction::local_now;
use crate::services::{AccountService, TransferInput, TransferService};
use crate::storage::Storage;

/// Transfer subcommands
#[derive(Subcommand)]
pub enum TransferCommands {
    /// Move money from one account to another
    Send {
        /// Source account name or ID
        from: String,
        /// Destination account name or ID
        to: String,
        /// Amount (e.g., "300.00")
        amount: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Date (YYYY-MM-DD), defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// List transfers, newest first
    List {
        /// Only transfers touching this account
        #[arg(short, long)]
        account: Option<String>,
    },
}

/// Handle a transfer command
pub fn handle_transfer_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransferCommands,
) -> LedgerResult<()> {
    let service = TransferService::new(storage);

    match cmd {
        TransferCommands::Send {
            from,
            to,
            amount,
            description,
            date,
        } => {
            let from = resolve_account(storage, &from)?;
            let to = resolve_account(storage, &to)?;

            let mut input = TransferInput::new(from.id, to.id, parse_amount(&amount)?);
            if let Some(description) = description {
                input = input.description(description);
            }
            if let Some(date) = date {
                input = input.at(parse_date(&date, settings)?.and_time(local_now().time()));
            }

            let transfer = service.transfer(input)?;
            println!(
                "Transferred {} from {} to {} ({})",
                transfer.amount.format_with_symbol(&settings.currency_symbol),
                from.name,
                to.name,
                transfer.id
            );
        }

        TransferCommands::List { account } => {
            let account_id = account
                .map(|a| resolve_account(storage, &a).map(|a| a.id))
                .transpose()?;
            let transfers = service.list(account_id)?;
            let names = account_names(&AccountService::new(storage).list()?);
            print!("{}", format_transfer_list(&transfers, &names));
        }
    }

    Ok(())
}
