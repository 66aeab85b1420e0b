//! Pocketbook - personal ledger
//!
//! Tracks money held in named accounts and every movement of money between
//! them: income, expenses, transfers, recurring and planned payments. Each
//! account's stored balance always equals the net effect of its ledger
//! history.
//!
//! # Architecture
//!
//! - `config`: Path resolution and user settings
//! - `error`: The `LedgerError` taxonomy
//! - `models`: Accounts, transactions, transfers, scheduled payments, categories
//! - `storage`: The ledger store, sessions and per-account locking
//! - `services`: Ledger operations (account ledger, transfers, scheduler, ...)
//! - `reports`: Read-only aggregations
//! - `audit`: Append-only mutation log
//! - `display` / `cli`: Thin presentation layer used by the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use pocketbook::config::LedgerPaths;
//! use pocketbook::services::{AccountService, EntryInput, TransactionService};
//! use pocketbook::storage::Storage;
//!
//! let storage = Storage::new(LedgerPaths::new()?)?;
//! let wallet = AccountService::new(&storage).create("Wallet", AccountType::Cash, Money::zero())?;
//! TransactionService::new(&storage)
//!     .record_income(EntryInput::new(wallet.id, Money::from_major(1000)).category("Salary"))?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
