use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use pocketbook::cli::{
    handle_account_command, handle_category_command, handle_planned_command,
    handle_recurring_command, handle_report_command, handle_transaction_command,
    handle_transfer_command,
};
use pocketbook::config::{LedgerPaths, Settings};
use pocketbook::display::format_recurring_outcomes;
use pocketbook::services::RecurringService;
use pocketbook::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "pocketbook",
    author = "Kaylee Beyene",
    version,
    about = "Personal ledger for accounts, transfers and scheduled payments",
    long_about = "Pocketbook tracks money held in named accounts: income, expenses, \
                  transfers between accounts, monthly recurring payments and one-off \
                  planned payments. Every balance always matches its history."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Data directory (defaults to the platform config directory)
    #[arg(long, global = true, env = "POCKETBOOK_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(pocketbook::cli::AccountCommands),

    /// Income and expense commands
    #[command(subcommand, alias = "transaction")]
    Txn(pocketbook::cli::TransactionCommands),

    /// Transfers between accounts
    #[command(subcommand)]
    Transfer(pocketbook::cli::TransferCommands),

    /// Monthly recurring payments
    #[command(subcommand)]
    Recurring(pocketbook::cli::RecurringCommands),

    /// One-off planned payments
    #[command(subcommand)]
    Planned(pocketbook::cli::PlannedCommands),

    /// Category vocabularies
    #[command(subcommand)]
    Category(pocketbook::cli::CategoryCommands),

    /// Reports
    #[command(subcommand)]
    Report(pocketbook::cli::ReportCommands),

    /// Show recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },

    /// Initialize the ledger and default categories
    Init,

    /// Show current configuration and paths
    Config,
}

/// Initializes the tracing subscriber.
fn init_logger(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => {
            let level = match verbose {
                0 => "warn",
                1 => "debug",
                _ => "trace",
            };
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let paths = match cli.data_dir.clone() {
        Some(dir) => LedgerPaths::with_base_dir(dir),
        None => LedgerPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::new(paths.clone())?;
    debug!(root = %paths.base_dir().display(), "Ledger opened");

    let ledger_command = !matches!(
        cli.command,
        None | Some(Commands::Config) | Some(Commands::History { .. }) | Some(Commands::Init)
    );
    if settings.process_recurring_on_start && ledger_command {
        let outcomes = RecurringService::new(&storage).process_due(Local::now().date_naive())?;
        if !outcomes.is_empty() {
            println!("Recurring payments due today:");
            print!("{}", format_recurring_outcomes(&outcomes));
            println!();
        }
    }

    match cli.command {
        Some(Commands::Account(cmd)) => handle_account_command(&storage, &settings, cmd)?,
        Some(Commands::Txn(cmd)) => handle_transaction_command(&storage, &settings, cmd)?,
        Some(Commands::Transfer(cmd)) => handle_transfer_command(&storage, &settings, cmd)?,
        Some(Commands::Recurring(cmd)) => handle_recurring_command(&storage, &settings, cmd)?,
        Some(Commands::Planned(cmd)) => handle_planned_command(&storage, &settings, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&storage, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::History { count }) => {
            let entries = storage.audit().read_recent(count)?;
            if entries.is_empty() {
                println!("No history yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Init) => {
            println!("Initializing Pocketbook at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            let seeded = initialize_storage(&storage)?;
            println!("Initialization complete!");
            if seeded > 0 {
                println!("Created {} default categories.", seeded);
                println!("Run 'pocketbook category list' to see them.");
            }
        }
        Some(Commands::Config) => {
            println!("Pocketbook Configuration");
            println!("========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Ledger file:    {}", paths.ledger_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:            {}", settings.currency_symbol);
            println!("  Date format:                {}", settings.date_format);
            println!(
                "  Process recurring on start: {}",
                settings.process_recurring_on_start
            );
            if !paths.is_initialized() {
                warn!("Pocketbook is not initialized; run 'pocketbook init'");
            }
        }
        None => {
            println!("Pocketbook - personal ledger");
            println!();
            println!("Run 'pocketbook --help' for usage information.");
            println!("Run 'pocketbook init' to get started.");
        }
    }

    Ok(())
}
