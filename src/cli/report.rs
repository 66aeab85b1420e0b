//! CLI commands for reports
//!
//! Provides commands for the category, monthly and comparison reports.

use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::Subcommand;

use super::parse_date;
use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::reports::{CategoryReport, ComparisonReport, MonthlyReport, Period};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Totals by category
    Categories {
        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end: Option<String>,

        /// Preset range: this-month, last-month, this-year
        #[arg(short, long, conflicts_with_all = ["start", "end"])]
        range: Option<String>,

        /// Include income categories, not only expenses
        #[arg(short, long)]
        all: bool,
    },

    /// Month-by-month income and expenses for a year
    Monthly {
        /// Year (defaults to the current year)
        year: Option<i32>,

        /// Also show months without transactions
        #[arg(long)]
        show_empty: bool,
    },

    /// Compare a period with the one before it
    Compare {
        /// Period length: day, week, month
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Resolve a named range relative to `today`
fn preset_range(name: &str, today: NaiveDate) -> LedgerResult<(NaiveDate, NaiveDate)> {
    match name.trim().to_lowercase().as_str() {
        "this-month" | "month" => Ok((Period::Month.bounds(today).0, today)),
        "last-month" => Ok(Period::Month.previous_bounds(today)),
        "this-year" | "year" => {
            let start = today - Duration::days(today.ordinal0() as i64);
            Ok((start, today))
        }
        _ => Err(LedgerError::Validation(format!(
            "Invalid range: '{}'. Use this-month, last-month or this-year",
            name
        ))),
    }
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> LedgerResult<()> {
    let currency = settings.currency_symbol.as_str();
    let today = Local::now().date_naive();

    match cmd {
        ReportCommands::Categories {
            start,
            end,
            range,
            all,
        } => {
            let (start, end) = match range {
                Some(range) => {
                    let (start, end) = preset_range(&range, today)?;
                    (Some(start), Some(end))
                }
                None => (
                    start.map(|d| parse_date(&d, settings)).transpose()?,
                    end.map(|d| parse_date(&d, settings)).transpose()?,
                ),
            };

            let report = CategoryReport::generate(storage, start, end)?;
            if all {
                print!("{}", report.format_terminal(currency));
            } else {
                print!("{}", report.format_expenses(currency));
            }
        }

        ReportCommands::Monthly { year, show_empty } => {
            let report = MonthlyReport::generate(storage, year.unwrap_or_else(|| today.year()))?;
            print!("{}", report.format_terminal(currency, show_empty));
        }

        ReportCommands::Compare { period, date } => {
            let period = Period::parse(&period).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid period: '{}'. Use day, week or month",
                    period
                ))
            })?;
            let date = match date {
                Some(date) => parse_date(&date, settings)?,
                None => today,
            };

            let report = ComparisonReport::generate(storage, period, date)?;
            print!("{}", report.format_terminal(currency));
        }
    }

    Ok(())
}
