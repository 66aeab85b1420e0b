//! Reports module for Pocketbook
//!
//! Read-only views over the ledger: totals by category, month-by-month
//! totals for a year, and period-over-period comparisons. Each report is
//! computed from one consistent snapshot of the store.

pub mod category;
pub mod comparison;
pub mod monthly;

pub use category::{CategoryReport, CategoryTotal};
pub use comparison::{percent_change, ComparisonReport, Period, PeriodTotals};
pub use monthly::{MonthTotals, MonthlyReport};
