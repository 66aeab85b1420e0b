//! Period Comparison Report
//!
//! Compares the day, ISO week or month containing a reference date with the
//! period immediately before it.

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;

use crate::display::report::{format_change, separator};
use crate::error::LedgerResult;
use crate::models::{Money, Transaction, TransactionType};
use crate::storage::Storage;

/// Length of the compared periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Day,
    /// ISO week, Monday to Sunday
    Week,
    #[default]
    Month,
}

impl Period {
    /// Parse a period from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" => Some(Self::Day),
            "week" | "w" => Some(Self::Week),
            "month" | "m" => Some(Self::Month),
            _ => None,
        }
    }

    /// First and last day (inclusive) of the period containing `date`
    pub fn bounds(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Day => (date, date),
            Self::Week => {
                let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                (start, start + Duration::days(6))
            }
            Self::Month => {
                let start = date - Duration::days(date.day0() as i64);
                let len = days_in_month(date.year(), date.month());
                (start, start + Duration::days(len as i64 - 1))
            }
        }
    }

    /// Bounds of the period immediately before the one containing `date`
    pub fn previous_bounds(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let (start, _) = self.bounds(date);
        self.bounds(start - Duration::days(1))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => f.pad("day"),
            Self::Week => f.pad("week"),
            Self::Month => f.pad("month"),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Percent change from `previous` to `current`
///
/// A zero baseline gives 100% when `current` is positive and 0% when both
/// are zero.
pub fn percent_change(previous: Money, current: Money) -> f64 {
    if previous.is_zero() {
        if current.is_zero() {
            0.0
        } else {
            100.0
        }
    } else {
        (current - previous).cents() as f64 / previous.cents() as f64 * 100.0
    }
}

/// Totals of one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTotals {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Money,
    /// Absolute value of the period's expenses
    pub expense: Money,
}

impl PeriodTotals {
    fn collect<'t>(
        transactions: impl Iterator<Item = &'t Transaction>,
        (start, end): (NaiveDate, NaiveDate),
    ) -> Self {
        let mut totals = Self {
            start,
            end,
            income: Money::zero(),
            expense: Money::zero(),
        };
        for txn in transactions {
            let day = txn.transaction_date.date();
            if day < start || day > end {
                continue;
            }
            match txn.transaction_type {
                TransactionType::Income => totals.income += txn.amount,
                TransactionType::Expense => totals.expense += txn.amount.abs(),
            }
        }
        totals
    }

    pub fn net(&self) -> Money {
        self.income - self.expense
    }

    /// Expenses as a percentage of income; `None` when there was no income
    pub fn expense_ratio(&self) -> Option<f64> {
        if self.income.is_zero() {
            None
        } else {
            Some(self.expense.cents() as f64 / self.income.cents() as f64 * 100.0)
        }
    }
}

/// Period Comparison Report
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub period: Period,
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
}

impl ComparisonReport {
    /// Compare the period containing `date` with the one before it
    pub fn generate(storage: &Storage, period: Period, date: NaiveDate) -> LedgerResult<Self> {
        storage.read(|tables| Self::from_transactions(tables.transactions.values(), period, date))
    }

    fn from_transactions<'t>(
        transactions: impl Iterator<Item = &'t Transaction> + Clone,
        period: Period,
        date: NaiveDate,
    ) -> Self {
        Self {
            period,
            current: PeriodTotals::collect(transactions.clone(), period.bounds(date)),
            previous: PeriodTotals::collect(transactions, period.previous_bounds(date)),
        }
    }

    pub fn income_change(&self) -> f64 {
        percent_change(self.previous.income, self.current.income)
    }

    pub fn expense_change(&self) -> f64 {
        percent_change(self.previous.expense, self.current.expense)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Comparison by {}: {}..{} vs {}..{}\n",
            self.period, self.current.start, self.current.end, self.previous.start, self.previous.end
        ));
        output.push_str(&separator(64));
        output.push('\n');
        output.push_str(&format!(
            "{:<16} {:>15} {:>15} {:>12}\n",
            "", "Current", "Previous", "Change"
        ));

        output.push_str(&format!(
            "{:<16} {:>15} {:>15} {:>12}\n",
            "Income",
            self.current.income,
            self.previous.income,
            format_change(self.income_change())
        ));
        output.push_str(&format!(
            "{:<16} {:>15} {:>15} {:>12}\n",
            "Expenses",
            self.current.expense,
            self.previous.expense,
            format_change(self.expense_change())
        ));
        output.push_str(&format!(
            "{:<16} {:>15} {:>15}\n",
            "Net",
            self.current.net().format_with_symbol(currency),
            self.previous.net().format_with_symbol(currency)
        ));

        let ratio = |totals: &PeriodTotals| match totals.expense_ratio() {
            Some(pct) => format!("{:.1}%", pct),
            None => "no income".to_string(),
        };
        output.push_str(&format!(
            "{:<16} {:>15} {:>15}\n",
            "Spent / earned",
            ratio(&self.current),
            ratio(&self.previous)
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, TransactionId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(id: i64, kind: TransactionType, major: i64, day: NaiveDate) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            AccountId::new(1),
            kind,
            Money::from_major(major),
            day.and_hms_opt(18, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_period_bounds() {
        // 2025-03-12 is a Wednesday
        let wed = date(2025, 3, 12);
        assert_eq!(Period::Day.bounds(wed), (wed, wed));
        assert_eq!(Period::Week.bounds(wed), (date(2025, 3, 10), date(2025, 3, 16)));
        assert_eq!(Period::Month.bounds(wed), (date(2025, 3, 1), date(2025, 3, 31)));

        assert_eq!(Period::Day.previous_bounds(wed).0, date(2025, 3, 11));
        assert_eq!(
            Period::Week.previous_bounds(wed),
            (date(2025, 3, 3), date(2025, 3, 9))
        );
        assert_eq!(
            Period::Month.previous_bounds(wed),
            (date(2025, 2, 1), date(2025, 2, 28))
        );
        assert_eq!(
            Period::Month.previous_bounds(date(2024, 3, 1)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            Period::Month.previous_bounds(date(2025, 1, 15)),
            (date(2024, 12, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn test_percent_change_baselines() {
        assert_eq!(percent_change(Money::zero(), Money::zero()), 0.0);
        assert_eq!(percent_change(Money::zero(), Money::from_major(5)), 100.0);
        assert_eq!(
            percent_change(Money::from_major(200), Money::from_major(300)),
            50.0
        );
        assert_eq!(
            percent_change(Money::from_major(200), Money::from_major(100)),
            -50.0
        );
    }

    #[test]
    fn test_month_comparison() {
        let txns = vec![
            txn(1, TransactionType::Income, 1000, date(2025, 3, 1)),
            txn(2, TransactionType::Expense, 250, date(2025, 3, 12)),
            txn(3, TransactionType::Expense, 500, date(2025, 2, 28)),
            txn(4, TransactionType::Expense, 999, date(2025, 4, 1)),
        ];
        let report = ComparisonReport::from_transactions(txns.iter(), Period::Month, date(2025, 3, 20));

        assert_eq!(report.current.income, Money::from_major(1000));
        assert_eq!(report.current.expense, Money::from_major(250));
        assert_eq!(report.current.net(), Money::from_major(750));
        assert_eq!(report.previous.expense, Money::from_major(500));
        assert_eq!(report.income_change(), 100.0);
        assert_eq!(report.expense_change(), -50.0);
        assert_eq!(report.current.expense_ratio(), Some(25.0));
        assert_eq!(report.previous.expense_ratio(), None);

        let output = report.format_terminal("₽");
        assert!(output.contains("+100.0%"));
        assert!(output.contains("no income"));
    }

    #[test]
    fn test_empty_periods() {
        let report =
            ComparisonReport::from_transactions(std::iter::empty(), Period::Week, date(2025, 1, 1));
        assert_eq!(report.income_change(), 0.0);
        assert_eq!(report.expense_change(), 0.0);
        assert_eq!(report.current.expense_ratio(), None);
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(Period::parse("Week"), Some(Period::Week));
        assert_eq!(Period::parse("m"), Some(Period::Month));
        assert_eq!(Period::parse("year"), None);
    }
}
