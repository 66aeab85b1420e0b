//! Recurring and planned payment display formatting

use super::report::{category_label, truncate};
use super::{account_name, AccountNames};
use crate::models::PlannedPayment;
use crate::services::{RecurringOutcome, RecurringSummary};

/// Format recurring payments as a table
pub fn format_recurring_list(summaries: &[RecurringSummary]) -> String {
    if summaries.is_empty() {
        return "No recurring payments.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<9} {:>3}  {:<16} {:>12}  {:<10} {:<8} {}\n",
        "ID", "Day", "Account", "Amount", "Last run", "Status", "Description"
    ));
    output.push_str(&"-".repeat(84));
    output.push('\n');

    for summary in summaries {
        let payment = &summary.payment;
        let last = payment
            .last_processed
            .map(|d| d.to_string())
            .unwrap_or_else(|| "never".to_string());

        output.push_str(&format!(
            "{:<9} {:>3}  {:<16} {:>12}  {:<10} {:<8} {}\n",
            payment.id.to_string(),
            payment.payment_day,
            truncate(summary.account_name.as_deref().unwrap_or("(unknown)"), 16),
            payment.amount,
            last,
            if payment.active { "active" } else { "paused" },
            payment.description
        ));
    }

    output
}

/// Format the outcomes of a scheduler run
pub fn format_recurring_outcomes(outcomes: &[RecurringOutcome]) -> String {
    if outcomes.is_empty() {
        return "No recurring payments due.\n".to_string();
    }

    let mut output = String::new();
    for outcome in outcomes {
        match &outcome.result {
            Ok(txn_id) => output.push_str(&format!(
                "  ✓ {} {} → {}\n",
                outcome.payment_id, outcome.description, txn_id
            )),
            Err(e) => output.push_str(&format!(
                "  ✗ {} {}: {}\n",
                outcome.payment_id, outcome.description, e
            )),
        }
    }

    let ok = outcomes.iter().filter(|o| o.is_ok()).count();
    output.push_str(&format!("{} processed, {} failed\n", ok, outcomes.len() - ok));
    output
}

/// Format planned payments as a table
pub fn format_planned_list(payments: &[PlannedPayment], names: &AccountNames) -> String {
    if payments.is_empty() {
        return "No planned payments.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<9} {:<10}  {:<16} {:>12}  {:<9} {:<18} {}\n",
        "ID", "Date", "Account", "Amount", "Status", "Category", "Description"
    ));
    output.push_str(&"-".repeat(96));
    output.push('\n');

    for payment in payments {
        output.push_str(&format!(
            "{:<9} {:<10}  {:<16} {:>12}  {:<9} {:<18} {}\n",
            payment.id.to_string(),
            payment.planned_date.to_string(),
            truncate(account_name(names, payment.account_id), 16),
            payment.amount,
            if payment.completed { "done" } else { "pending" },
            truncate(category_label(&payment.category), 18),
            payment.description
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::models::{
        AccountId, Money, PlannedPaymentId, RecurringPayment, RecurringPaymentId, TransactionId,
    };
    use chrono::NaiveDate;

    #[test]
    fn test_recurring_list_marks_dangling_account() {
        let payment = RecurringPayment::new(
            RecurringPaymentId::new(1),
            AccountId::new(4),
            Money::from_major(200),
            "Rent",
            "Rent",
            5,
        );
        let output = format_recurring_list(&[RecurringSummary {
            payment,
            account_name: None,
        }]);
        assert!(output.contains("(unknown)"));
        assert!(output.contains("never"));
        assert!(output.contains("active"));
    }

    #[test]
    fn test_outcomes_summary() {
        let outcomes = vec![
            RecurringOutcome {
                payment_id: RecurringPaymentId::new(1),
                description: "Rent".into(),
                result: Ok(TransactionId::new(7)),
            },
            RecurringOutcome {
                payment_id: RecurringPaymentId::new(2),
                description: "Gym".into(),
                result: Err(LedgerError::account_not_found("acc-3")),
            },
        ];
        let output = format_recurring_outcomes(&outcomes);
        assert!(output.contains("txn-7"));
        assert!(output.contains("Account not found: acc-3"));
        assert!(output.ends_with("1 processed, 1 failed\n"));
    }

    #[test]
    fn test_planned_list() {
        let payment = PlannedPayment::new(
            PlannedPaymentId::new(3),
            AccountId::new(1),
            Money::from_major(150),
            "Concert",
            "",
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
        );
        let mut names = AccountNames::new();
        names.insert(AccountId::new(1), "Wallet".into());

        let output = format_planned_list(&[payment], &names);
        assert!(output.contains("pln-3"));
        assert!(output.contains("2025-06-10"));
        assert!(output.contains("pending"));
        assert!(output.contains("Wallet"));
    }
}
