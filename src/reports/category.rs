//! Category Report
//!
//! Sums transactions by (category, type) over an optional date range.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::display::report::{category_label, format_bar, format_percentage, separator};
use crate::error::LedgerResult;
use crate::models::{Money, Transaction, TransactionType};
use crate::storage::Storage;

/// Total of one category within one transaction type
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub transaction_type: TransactionType,
    /// Sum of signed amounts (negative for expenses)
    pub total: Money,
    pub transaction_count: usize,
    /// Share of the type's total, 0-100
    pub percentage: f64,
}

/// Category Report
#[derive(Debug, Clone)]
pub struct CategoryReport {
    /// Inclusive lower bound, by calendar day
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound, by calendar day
    pub end_date: Option<NaiveDate>,
    /// Income rows first, then expenses; each by absolute total descending
    pub rows: Vec<CategoryTotal>,
    pub total_income: Money,
    /// Sum of expenses (negative)
    pub total_expense: Money,
}

impl CategoryReport {
    /// Generate the report from one snapshot of the ledger
    pub fn generate(
        storage: &Storage,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Self> {
        storage.read(|tables| {
            Self::from_transactions(tables.transactions.values(), start_date, end_date)
        })
    }

    fn from_transactions<'t>(
        transactions: impl Iterator<Item = &'t Transaction>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        let mut groups: BTreeMap<(TransactionType, String), (Money, usize)> = BTreeMap::new();
        let mut total_income = Money::zero();
        let mut total_expense = Money::zero();

        for txn in transactions {
            let day = txn.transaction_date.date();
            if start_date.map_or(false, |start| day < start)
                || end_date.map_or(false, |end| day > end)
            {
                continue;
            }

            let entry = groups
                .entry((txn.transaction_type, txn.category.clone()))
                .or_insert((Money::zero(), 0));
            entry.0 += txn.amount;
            entry.1 += 1;

            match txn.transaction_type {
                TransactionType::Income => total_income += txn.amount,
                TransactionType::Expense => total_expense += txn.amount,
            }
        }

        let mut rows: Vec<CategoryTotal> = groups
            .into_iter()
            .map(|((transaction_type, category), (total, transaction_count))| {
                let type_total = match transaction_type {
                    TransactionType::Income => total_income,
                    TransactionType::Expense => total_expense,
                };
                CategoryTotal {
                    category,
                    transaction_type,
                    total,
                    transaction_count,
                    percentage: share(total, type_total),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.transaction_type
                .cmp(&b.transaction_type)
                .then(b.total.abs().cmp(&a.total.abs()))
                .then(a.category.cmp(&b.category))
        });

        Self {
            start_date,
            end_date,
            rows,
            total_income,
            total_expense,
        }
    }

    /// Rows of one type, largest first
    pub fn rows_of(&self, transaction_type: TransactionType) -> Vec<&CategoryTotal> {
        self.rows
            .iter()
            .filter(|r| r.transaction_type == transaction_type)
            .collect()
    }

    /// Expense rows, largest first
    pub fn expenses(&self) -> Vec<&CategoryTotal> {
        self.rows_of(TransactionType::Expense)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn period_label(&self) -> String {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!("{} to {}", start, end),
            (Some(start), None) => format!("from {}", start),
            (None, Some(end)) => format!("up to {}", end),
            (None, None) => "all time".to_string(),
        }
    }

    /// Format the full report (income and expenses) for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("Category Report: {}\n", self.period_label()));
        output.push_str(&separator(62));
        output.push('\n');

        if self.is_empty() {
            output.push_str("No transactions in this period.\n");
            return output;
        }

        for (title, kind, total) in [
            ("INCOME", TransactionType::Income, self.total_income),
            ("EXPENSES", TransactionType::Expense, self.total_expense),
        ] {
            let rows = self.rows_of(kind);
            if rows.is_empty() {
                continue;
            }

            output.push_str(&format!(
                "\n{}\n{:<30} {:>14} {:>6} {:>8}\n",
                title, "Category", "Amount", "Count", "Share"
            ));
            for row in rows {
                output.push_str(&format!(
                    "{:<30} {:>14} {:>6} {:>8}\n",
                    category_label(&row.category),
                    row.total.abs(),
                    row.transaction_count,
                    format_percentage(row.percentage)
                ));
            }
            output.push_str(&format!(
                "{:<30} {:>14}\n",
                "Total",
                total.abs().format_with_symbol(currency)
            ));
        }

        output
    }

    /// Format the expense breakdown with bars, largest category first
    pub fn format_expenses(&self, currency: &str) -> String {
        let rows = self.expenses();
        let mut output = String::new();
        output.push_str(&format!("Expenses by Category: {}\n", self.period_label()));
        output.push_str(&separator(62));
        output.push('\n');

        if rows.is_empty() {
            output.push_str("No expenses in this period.\n");
            return output;
        }

        let max = rows
            .first()
            .map(|r| r.total.abs().as_f64())
            .unwrap_or(0.0);
        for row in &rows {
            output.push_str(&format!(
                "{:<24} {:>12} {:>8}  {}\n",
                category_label(&row.category),
                row.total.abs(),
                format_percentage(row.percentage),
                format_bar(row.total.abs().as_f64(), max, 12)
            ));
        }

        output.push_str(&separator(62));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>12} {:>8}\n",
            "TOTAL",
            self.total_expense.abs().format_with_symbol(currency),
            "100.0%"
        ));
        output
    }
}

fn share(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        0.0
    } else {
        part.abs().cents() as f64 / whole.abs().cents() as f64 * 100.0
    }
}
