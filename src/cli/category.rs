//! Category CLI commands
//!
//! Implements CLI commands for the expense and income vocabularies.

use clap::Subcommand;

use crate::display::format_category_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryKind};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only one vocabulary (expense or income)
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Add a category
    Add {
        /// Vocabulary (expense or income)
        kind: String,
        /// Category name
        name: String,
    },
    /// Rename a category; past transactions keep the old name
    Rename {
        /// Vocabulary (expense or income)
        kind: String,
        /// Category name or ID
        category: String,
        /// New name
        new_name: String,
    },
    /// Delete a category
    Delete {
        /// Vocabulary (expense or income)
        kind: String,
        /// Category name or ID
        category: String,
    },
}

fn parse_kind(input: &str) -> LedgerResult<CategoryKind> {
    CategoryKind::parse(input).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid category kind: '{}'. Use expense or income",
            input
        ))
    })
}

fn resolve(service: &CategoryService<'_>, kind: CategoryKind, identifier: &str) -> LedgerResult<Category> {
    service
        .find(kind, identifier)?
        .ok_or_else(|| LedgerError::category_not_found(identifier))
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> LedgerResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { kind } => {
            let kinds = match kind {
                Some(kind) => vec![parse_kind(&kind)?],
                None => vec![CategoryKind::Expense, CategoryKind::Income],
            };
            for (i, kind) in kinds.into_iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", format_category_list(kind, &service.list(kind)?));
            }
        }

        CategoryCommands::Add { kind, name } => {
            let kind = parse_kind(&kind)?;
            let category = service.add(kind, &name)?;
            println!("Added {} category: {} ({})", kind, category.name, category.id);
        }

        CategoryCommands::Rename {
            kind,
            category,
            new_name,
        } => {
            let kind = parse_kind(&kind)?;
            let found = resolve(&service, kind, &category)?;
            let renamed = service.rename(found.id, &new_name)?;
            println!("Renamed category: {} -> {}", found.name, renamed.name);
        }

        CategoryCommands::Delete { kind, category } => {
            let kind = parse_kind(&kind)?;
            let found = resolve(&service, kind, &category)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted {} category: {}", kind, deleted.name);
        }
    }

    Ok(())
}
