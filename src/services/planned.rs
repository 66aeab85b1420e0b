//! Planned payment service
//!
//! One-off expenses scheduled for a date. A planned payment is executed at
//! most once: the expense and the `completed` flag land in the same commit,
//! under the owning account's lock.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Account, AccountId, Money, PlannedPayment, PlannedPaymentId, Transaction, TransactionType,
};
use crate::storage::Storage;

use super::begin_for_owner;
use super::transaction::{record_entry, EntryInput};

/// Service for planned payments
pub struct PlannedService<'a> {
    storage: &'a Storage,
}

/// Input for a new planned payment
#[derive(Debug, Clone)]
pub struct PlannedInput {
    pub account_id: AccountId,
    pub amount: Money,
    pub description: String,
    pub category: String,
    pub planned_date: NaiveDate,
}

impl PlannedInput {
    pub fn new(account_id: AccountId, amount: Money, planned_date: NaiveDate) -> Self {
        Self {
            account_id,
            amount,
            description: String::new(),
            category: String::new(),
            planned_date,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Changes to a pending planned payment
#[derive(Debug, Clone, Default)]
pub struct PlannedEdit {
    pub account_id: Option<AccountId>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub planned_date: Option<NaiveDate>,
}

impl PlannedEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.planned_date = Some(date);
        self
    }
}

/// Which planned payments to list
#[derive(Debug, Clone, Copy, Default)]
pub struct PlannedFilter {
    /// Include completed payments (pending only by default)
    pub include_completed: bool,
    /// Only payments scheduled on or before this date
    pub due_by: Option<NaiveDate>,
}

impl PlannedFilter {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            include_completed: true,
            due_by: None,
        }
    }

    pub fn due_by(mut self, date: NaiveDate) -> Self {
        self.due_by = Some(date);
        self
    }

    fn matches(&self, payment: &PlannedPayment) -> bool {
        (self.include_completed || payment.is_pending())
            && self.due_by.map_or(true, |date| payment.planned_date <= date)
    }
}

impl<'a> PlannedService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Schedule a one-off expense on an existing account
    pub fn create(&self, input: PlannedInput) -> LedgerResult<PlannedPayment> {
        let mut session = self.storage.begin_locked(&[input.account_id])?;
        let account: Account = session.require(input.account_id)?;

        let payment = PlannedPayment::new(
            session.next_id::<PlannedPayment>()?,
            account.id,
            input.amount,
            input.description.trim(),
            input.category.trim(),
            input.planned_date,
        );
        payment.validate()?;

        session.insert(payment.clone());
        session.commit()?;

        info!(
            id = %payment.id,
            account = %account.name,
            amount = %payment.amount,
            date = %payment.planned_date,
            "Created planned payment"
        );
        Ok(payment)
    }

    /// Get a planned payment by ID
    pub fn get(&self, id: PlannedPaymentId) -> LedgerResult<Option<PlannedPayment>> {
        self.storage.get(id)
    }

    /// Planned payments matching `filter`, in date order
    pub fn list(&self, filter: PlannedFilter) -> LedgerResult<Vec<PlannedPayment>> {
        let mut payments: Vec<PlannedPayment> = self.storage.read(|tables| {
            tables
                .planned_payments
                .values()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect()
        })?;

        payments.sort_by_key(|p| (p.planned_date, p.id));
        Ok(payments)
    }

    /// Edit a pending planned payment
    pub fn edit(&self, id: PlannedPaymentId, edit: PlannedEdit) -> LedgerResult<PlannedPayment> {
        let (mut session, before) =
            begin_for_owner::<PlannedPayment>(self.storage, id, |p| p.account_id, edit.account_id)?;
        if before.completed {
            return Err(LedgerError::AlreadyCompleted(id.to_string()));
        }
        let mut after = before.clone();

        if let Some(account_id) = edit.account_id {
            let account: Account = session.require(account_id)?;
            after.account_id = account.id;
        }
        if let Some(amount) = edit.amount {
            after.amount = amount;
        }
        if let Some(description) = edit.description {
            after.description = description.trim().to_string();
        }
        if let Some(category) = edit.category {
            after.category = category.trim().to_string();
        }
        if let Some(date) = edit.planned_date {
            after.planned_date = date;
        }

        after.validate()?;
        if after == before {
            return Ok(before);
        }

        session.update(&before, after.clone());
        session.commit()?;

        info!(id = %id, amount = %after.amount, date = %after.planned_date, "Edited planned payment");
        Ok(after)
    }

    /// Record the planned expense and mark the payment completed
    pub fn execute(&self, id: PlannedPaymentId) -> LedgerResult<Transaction> {
        let (mut session, pending) =
            begin_for_owner::<PlannedPayment>(self.storage, id, |p| p.account_id, None)?;
        if pending.completed {
            return Err(LedgerError::AlreadyCompleted(id.to_string()));
        }

        let txn = record_entry(
            &mut session,
            TransactionType::Expense,
            EntryInput::new(pending.account_id, pending.amount)
                .description(pending.description.clone())
                .category(pending.category.clone()),
        )?;

        let mut completed = pending.clone();
        completed.completed = true;
        session.update(&pending, completed);
        session.commit()?;

        info!(id = %id, transaction = %txn.id, amount = %pending.amount, "Executed planned payment");
        Ok(txn)
    }

    /// Delete a planned payment in any state
    pub fn delete(&self, id: PlannedPaymentId) -> LedgerResult<PlannedPayment> {
        let (mut session, payment) =
            begin_for_owner::<PlannedPayment>(self.storage, id, |p| p.account_id, None)?;
        if payment.completed {
            warn!(id = %id, "Deleting a completed planned payment removes it from history");
        }

        session.delete(&payment);
        session.commit()?;

        info!(id = %id, "Deleted planned payment");
        Ok(payment)
    }
}
