//! Core data models for Pocketbook
//!
//! This module contains the rows of the ledger: accounts, transactions,
//! transfers, recurring and planned payments, and the category vocabularies.

pub mod account;
pub mod category;
pub mod ids;
pub mod money;
pub mod planned;
pub mod recurring;
pub mod transaction;
pub mod transfer;

pub use account::{Account, AccountType};
pub use category::{Category, CategoryKind};
pub use ids::{
    AccountId, CategoryId, PlannedPaymentId, RecurringPaymentId, TransactionId, TransferId,
};
pub use money::Money;
pub use planned::PlannedPayment;
pub use recurring::RecurringPayment;
pub use transaction::{apply_correction, Correction, Transaction, TransactionType};
pub use transfer::Transfer;
