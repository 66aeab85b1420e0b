//! Monthly Report
//!
//! Income, expense and net for each calendar month of a year. Transfers
//! move money between the user's own accounts and are not counted.

use chrono::Datelike;

use crate::display::report::{double_separator, separator};
use crate::error::LedgerResult;
use crate::models::{Money, Transaction, TransactionType};
use crate::storage::Storage;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One month of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTotals {
    /// 1-12
    pub month: u32,
    pub income: Money,
    /// Sum of expenses (negative)
    pub expense: Money,
}

impl MonthTotals {
    fn empty(month: u32) -> Self {
        Self {
            month,
            income: Money::zero(),
            expense: Money::zero(),
        }
    }

    pub fn net(&self) -> Money {
        self.income + self.expense
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize).saturating_sub(1) % 12]
    }

    pub fn has_activity(&self) -> bool {
        !self.income.is_zero() || !self.expense.is_zero()
    }
}

/// Monthly Report
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub year: i32,
    /// Always twelve entries, January first
    pub months: Vec<MonthTotals>,
}

impl MonthlyReport {
    /// Generate the report for `year` from one snapshot of the ledger
    pub fn generate(storage: &Storage, year: i32) -> LedgerResult<Self> {
        storage.read(|tables| Self::from_transactions(tables.transactions.values(), year))
    }

    fn from_transactions<'t>(transactions: impl Iterator<Item = &'t Transaction>, year: i32) -> Self {
        let mut months: Vec<MonthTotals> = (1..=12).map(MonthTotals::empty).collect();

        for txn in transactions.filter(|t| t.transaction_date.year() == year) {
            let slot = &mut months[txn.transaction_date.month0() as usize];
            match txn.transaction_type {
                TransactionType::Income => slot.income += txn.amount,
                TransactionType::Expense => slot.expense += txn.amount,
            }
        }

        Self { year, months }
    }

    pub fn total_income(&self) -> Money {
        self.months.iter().map(|m| m.income).sum()
    }

    pub fn total_expense(&self) -> Money {
        self.months.iter().map(|m| m.expense).sum()
    }

    pub fn total_net(&self) -> Money {
        self.total_income() + self.total_expense()
    }

    pub fn has_activity(&self) -> bool {
        self.months.iter().any(MonthTotals::has_activity)
    }

    /// Format the report for terminal display
    ///
    /// Months without activity are omitted unless `show_empty` is set.
    pub fn format_terminal(&self, currency: &str, show_empty: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("Monthly Report: {}\n", self.year));
        output.push_str(&double_separator(60));
        output.push('\n');

        if !self.has_activity() {
            output.push_str(&format!("No transactions in {}.\n", self.year));
            return output;
        }

        output.push_str(&format!(
            "{:<12} {:>15} {:>15} {:>15}\n",
            "Month", "Income", "Expenses", "Net"
        ));
        output.push_str(&separator(60));
        output.push('\n');

        for month in self
            .months
            .iter()
            .filter(|m| show_empty || m.has_activity())
        {
            output.push_str(&format!(
                "{:<12} {:>15} {:>15} {:>15}\n",
                month.name(),
                month.income,
                month.expense.abs(),
                month.net()
            ));
        }

        output.push_str(&separator(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<12} {:>15} {:>15} {:>15}\n",
            "TOTAL",
            self.total_income().format_with_symbol(currency),
            self.total_expense().abs().format_with_symbol(currency),
            self.total_net().format_with_symbol(currency)
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, TransactionId};
    use chrono::NaiveDate;

    fn txn(id: i64, kind: TransactionType, major: i64, y: i32, m: u32, d: u32) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            AccountId::new(1),
            kind,
            Money::from_major(major),
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_twelve_months_with_zero_fill() {
        let txns = vec![
            txn(1, TransactionType::Income, 1000, 2025, 1, 15),
            txn(2, TransactionType::Expense, 300, 2025, 1, 20),
            txn(3, TransactionType::Expense, 50, 2025, 3, 31),
            txn(4, TransactionType::Income, 999, 2024, 12, 31),
        ];
        let report = MonthlyReport::from_transactions(txns.iter(), 2025);

        assert_eq!(report.months.len(), 12);
        assert_eq!(report.months[0].income, Money::from_major(1000));
        assert_eq!(report.months[0].expense, Money::from_major(-300));
        assert_eq!(report.months[0].net(), Money::from_major(700));
        assert!(!report.months[1].has_activity());
        assert_eq!(report.months[2].expense, Money::from_major(-50));
        assert_eq!(report.months[11].name(), "December");
        assert!(!report.months[11].has_activity());

        assert_eq!(report.total_income(), Money::from_major(1000));
        assert_eq!(report.total_expense(), Money::from_major(-350));
        assert_eq!(report.total_net(), Money::from_major(650));
    }

    #[test]
    fn test_format_skips_quiet_months() {
        let txns = vec![txn(1, TransactionType::Income, 10, 2025, 5, 1)];
        let report = MonthlyReport::from_transactions(txns.iter(), 2025);

        let output = report.format_terminal("₽", false);
        assert!(output.contains("May"));
        assert!(!output.contains("June"));
        assert!(report.format_terminal("₽", true).contains("June"));
    }

    #[test]
    fn test_empty_year() {
        let report = MonthlyReport::from_transactions(std::iter::empty(), 2030);
        assert!(!report.has_activity());
        assert!(report.format_terminal("", false).contains("No transactions in 2030"));
    }
}
