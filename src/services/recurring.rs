//! Recurring payment service
//!
//! Manages monthly recurring expense definitions and fires the ones due on
//! a given day. Each firing records the expense and stamps `last_processed`
//! in one commit, so a definition fires at most once per calendar month even
//! when several processes race.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::LedgerResult;
use crate::models::transaction::local_now;
use crate::models::{
    Account, AccountId, Money, RecurringPayment, RecurringPaymentId, TransactionId,
    TransactionType,
};
use crate::storage::Storage;

use super::begin_for_owner;
use super::transaction::{record_entry, EntryInput};

/// Service for recurring payments
pub struct RecurringService<'a> {
    storage: &'a Storage,
}

/// Input for a new recurring payment
#[derive(Debug, Clone)]
pub struct RecurringInput {
    pub account_id: AccountId,
    pub amount: Money,
    pub description: String,
    pub category: String,
    pub payment_day: u32,
}

impl RecurringInput {
    pub fn new(account_id: AccountId, amount: Money, payment_day: u32) -> Self {
        Self {
            account_id,
            amount,
            description: String::new(),
            category: String::new(),
            payment_day,
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

/// Changes to a recurring payment; `None` fields are left as they are
#[derive(Debug, Clone, Default)]
pub struct RecurringUpdate {
    pub account_id: Option<AccountId>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub payment_day: Option<u32>,
    pub active: Option<bool>,
}

impl RecurringUpdate {
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

    pub fn payment_day(mut self, day: u32) -> Self {
        self.payment_day = Some(day);
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// A recurring payment joined with its account's name
#[derive(Debug, Clone)]
pub struct RecurringSummary {
    pub payment: RecurringPayment,
    /// `None` when the account no longer exists
    pub account_name: Option<String>,
}

/// Result of one definition's firing attempt
#[derive(Debug)]
pub struct RecurringOutcome {
    pub payment_id: RecurringPaymentId,
    pub description: String,
    pub result: LedgerResult<TransactionId>,
}

impl RecurringOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl<'a> RecurringService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an active recurring payment on an existing account
    pub fn create(&self, input: RecurringInput) -> LedgerResult<RecurringPayment> {
        let mut session = self.storage.begin_locked(&[input.account_id])?;
        let account: Account = session.require(input.account_id)?;

        let payment = RecurringPayment::new(
            session.next_id::<RecurringPayment>()?,
            account.id,
            input.amount,
            input.description.trim(),
            input.category.trim(),
            input.payment_day,
        );
        payment.validate()?;

        session.insert(payment.clone());
        session.commit()?;

        info!(
            id = %payment.id,
            account = %account.name,
            amount = %payment.amount,
            day = payment.payment_day,
            "Created recurring payment"
        );
        Ok(payment)
    }

    /// Get a recurring payment by ID
    pub fn get(&self, id: RecurringPaymentId) -> LedgerResult<Option<RecurringPayment>> {
        self.storage.get(id)
    }

    /// All recurring payments ordered by payment day, with account names
    pub fn list(&self) -> LedgerResult<Vec<RecurringSummary>> {
        let mut summaries: Vec<RecurringSummary> = self.storage.read(|tables| {
            tables
                .recurring_payments
                .values()
                .map(|payment| RecurringSummary {
                    account_name: tables
                        .accounts
                        .get(&payment.account_id)
                        .map(|a| a.name.clone()),
                    payment: payment.clone(),
                })
                .collect()
        })?;

        summaries.sort_by_key(|s| (s.payment.payment_day, s.payment.id));
        Ok(summaries)
    }

    /// Apply `update` to a recurring payment
    ///
    /// Moving a definition to another account locks both accounts.
    pub fn update(
        &self,
        id: RecurringPaymentId,
        update: RecurringUpdate,
    ) -> LedgerResult<RecurringPayment> {
        let (mut session, before) =
            begin_for_owner::<RecurringPayment>(self.storage, id, |r| r.account_id, update.account_id)?;
        let mut after = before.clone();

        if let Some(account_id) = update.account_id {
            let account: Account = session.require(account_id)?;
            after.account_id = account.id;
        }
        if let Some(amount) = update.amount {
            after.amount = amount;
        }
        if let Some(description) = update.description {
            after.description = description.trim().to_string();
        }
        if let Some(category) = update.category {
            after.category = category.trim().to_string();
        }
        if let Some(day) = update.payment_day {
            after.payment_day = day;
        }
        if let Some(active) = update.active {
            after.active = active;
        }

        after.validate()?;
        if after == before {
            return Ok(before);
        }

        session.update(&before, after.clone());
        session.commit()?;

        info!(id = %id, active = after.active, day = after.payment_day, "Updated recurring payment");
        Ok(after)
    }

    /// Enable or disable a recurring payment
    pub fn set_active(&self, id: RecurringPaymentId, active: bool) -> LedgerResult<RecurringPayment> {
        self.update(id, RecurringUpdate::new().active(active))
    }

    /// Delete a recurring payment; transactions it already created remain
    pub fn delete(&self, id: RecurringPaymentId) -> LedgerResult<RecurringPayment> {
        let (mut session, payment) =
            begin_for_owner::<RecurringPayment>(self.storage, id, |r| r.account_id, None)?;
        session.delete(&payment);
        session.commit()?;

        info!(id = %id, "Deleted recurring payment");
        Ok(payment)
    }

    /// Fire every active definition due on `today`
    ///
    /// Definitions already processed this month are skipped silently. A
    /// failure is reported in its outcome and never stops the others.
    pub fn process_due(&self, today: NaiveDate) -> LedgerResult<Vec<RecurringOutcome>> {
        let candidates: Vec<RecurringPayment> = self.storage.read(|tables| {
            tables
                .recurring_payments
                .values()
                .filter(|r| r.active && r.payment_day == today.day())
                .cloned()
                .collect()
        })?;

        let mut outcomes = Vec::new();
        for candidate in candidates {
            if candidate.processed_in_month_of(today) {
                debug!(id = %candidate.id, "Recurring payment already processed this month");
                continue;
            }

            let result = match self.fire(candidate.id, today) {
                Ok(Some(txn_id)) => Ok(txn_id),
                Ok(None) => {
                    debug!(id = %candidate.id, "Recurring payment no longer due");
                    continue;
                }
                Err(e) => {
                    warn!(id = %candidate.id, error = %e, "Recurring payment failed");
                    Err(e)
                }
            };

            outcomes.push(RecurringOutcome {
                payment_id: candidate.id,
                description: candidate.description,
                result,
            });
        }

        let fired = outcomes.iter().filter(|o| o.is_ok()).count();
        info!(date = %today, fired, failed = outcomes.len() - fired, "Processed recurring payments");
        Ok(outcomes)
    }

    /// Record one definition's expense and stamp it, under its account's lock
    ///
    /// Returns `None` if, once locked, the definition turns out not to be due.
    fn fire(&self, id: RecurringPaymentId, today: NaiveDate) -> LedgerResult<Option<TransactionId>> {
        let (mut session, current) =
            begin_for_owner::<RecurringPayment>(self.storage, id, |r| r.account_id, None)?;
        if !current.is_due_on(today) {
            return Ok(None);
        }

        let txn = record_entry(
            &mut session,
            TransactionType::Expense,
            EntryInput::new(current.account_id, current.amount)
                .description(format!("Auto: {}", current.description))
                .category(current.category.clone())
                .at(today.and_time(local_now().time())),
        )?;

        let mut after = current.clone();
        after.last_processed = Some(today);
        session.update(&current, after);
        session.commit()?;

        info!(id = %id, transaction = %txn.id, amount = %current.amount, "Fired recurring payment");
        Ok(Some(txn.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerPaths;
    use crate::error::LedgerError;
    use crate::models::{AccountType, Transaction};
    use crate::services::AccountService;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wallet(storage: &Storage, initial: i64) -> Account {
        AccountService::new(storage)
            .create("Wallet", AccountType::Cash, Money::from_major(initial))
            .unwrap()
    }

    fn rent(account_id: AccountId, day: u32) -> RecurringInput {
        RecurringInput::new(account_id, Money::from_major(200), day)
            .description("Rent")
            .category("Rent")
    }

    #[test]
    fn test_create_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let account = wallet(&storage, 0);
        let service = RecurringService::new(&storage);

        assert!(matches!(
            service.create(rent(account.id, 0)),
            Err(LedgerError::InvalidRange(_))
        ));
        assert!(matches!(
            service.create(rent(account.id, 32)),
            Err(LedgerError::InvalidRange(_))
        ));
        assert!(matches!(
            service.create(RecurringInput::new(account.id, Money::zero(), 5)),
            Err(LedgerError::InvalidRange(_))
        ));
        assert!(service
            .create(rent(AccountId::new(77), 5))
            .unwrap_err()
            .is_not_found());

        let created = service.create(rent(account.id, 31)).unwrap();
        assert!(created.active);
        assert!(created.last_processed.is_none());
    }

    #[test]
    fn test_fires_once_per_month() {
        let (_temp_dir, storage) = create_test_storage();
        let account = wallet(&storage, 500);
        let service = RecurringService::new(&storage);
        let rec = service.create(rent(account.id, 5)).unwrap();

        let outcomes = service.process_due(date(2025, 3, 5)).unwrap();
        assert_eq!(outcomes.len(), 1);
        let txn_id = *outcomes[0].result.as_ref().unwrap();

        let txn = storage.require::<Transaction>(txn_id).unwrap();
        assert_eq!(txn.description, "Auto: Rent");
        assert_eq!(txn.category, "Rent");
        assert_eq!(txn.amount, Money::from_major(-200));
        assert_eq!(txn.transaction_date.date(), date(2025, 3, 5));
        assert_eq!(
            storage.require::<Account>(account.id).unwrap().balance,
            Money::from_major(300)
        );
        assert_eq!(
            service.get(rec.id).unwrap().unwrap().last_processed,
            Some(date(2025, 3, 5))
        );

        // Same day again: nothing, and nothing reported
        assert!(service.process_due(date(2025, 3, 5)).unwrap().is_empty());
        // Wrong day: nothing
        assert!(service.process_due(date(2025, 4, 6)).unwrap().is_empty());
        // Next month fires again
        assert_eq!(service.process_due(date(2025, 4, 5)).unwrap().len(), 1);
        assert_eq!(
            storage.require::<Account>(account.id).unwrap().balance,
            Money::from_major(100)
        );
    }

    #[test]
    fn test_failure_is_isolated_and_retryable() {
        let (_temp_dir, storage) = create_test_storage();
        let poor = wallet(&storage, 50);
        let rich = AccountService::new(&storage)
            .create("Card", AccountType::Debit, Money::from_major(1000))
            .unwrap();
        let service = RecurringService::new(&storage);
        let failing = service.create(rent(poor.id, 5)).unwrap();
        let working = service.create(rent(rich.id, 5)).unwrap();

        let outcomes = service.process_due(date(2025, 3, 5)).unwrap();
        assert_eq!(outcomes.len(), 2);
        let failed = outcomes.iter().find(|o| o.payment_id == failing.id).unwrap();
        assert!(failed.result.as_ref().unwrap_err().is_insufficient_funds());
        assert!(outcomes
            .iter()
            .find(|o| o.payment_id == working.id)
            .unwrap()
            .is_ok());

        assert!(service.get(failing.id).unwrap().unwrap().last_processed.is_none());
        assert_eq!(
            storage.require::<Account>(poor.id).unwrap().balance,
            Money::from_major(50)
        );

        // Topping up lets the same day succeed
        crate::services::TransactionService::new(&storage)
            .record_income(EntryInput::new(poor.id, Money::from_major(500)))
            .unwrap();
        let retry = service.process_due(date(2025, 3, 5)).unwrap();
        assert_eq!(retry.len(), 1);
        assert!(retry[0].is_ok());
    }

    #[test]
    fn test_inactive_and_short_months() {
        let (_temp_dir, storage) = create_test_storage();
        let account = wallet(&storage, 1000);
        let service = RecurringService::new(&storage);
        let late = service.create(rent(account.id, 31)).unwrap();
        let paused = service.create(rent(account.id, 10)).unwrap();
        service.set_active(paused.id, false).unwrap();

        assert!(service.process_due(date(2025, 4, 30)).unwrap().is_empty());
        assert!(service.process_due(date(2025, 3, 10)).unwrap().is_empty());
        assert_eq!(service.process_due(date(2025, 3, 31)).unwrap().len(), 1);
        assert!(service.get(late.id).unwrap().unwrap().last_processed.is_some());
    }

    #[test]
    fn test_update_and_list() {
        let (_temp_dir, storage) = create_test_storage();
        let account = wallet(&storage, 0);
        let other = AccountService::new(&storage)
            .create("Card", AccountType::Debit, Money::zero())
            .unwrap();
        let service = RecurringService::new(&storage);
        let rec = service.create(rent(account.id, 20)).unwrap();
        service.create(rent(account.id, 3)).unwrap();

        let updated = service
            .update(
                rec.id,
                RecurringUpdate::new()
                    .account(other.id)
                    .amount(Money::from_major(250))
                    .payment_day(1),
            )
            .unwrap();
        assert_eq!(updated.account_id, other.id);
        assert_eq!(updated.amount, Money::from_major(250));

        assert!(matches!(
            service.update(rec.id, RecurringUpdate::new().payment_day(40)),
            Err(LedgerError::InvalidRange(_))
        ));

        let list = service.list().unwrap();
        assert_eq!(list[0].payment.id, rec.id);
        assert_eq!(list[0].account_name.as_deref(), Some("Card"));
    }

    #[test]
    fn test_delete_keeps_history() {
        let (_temp_dir, storage) = create_test_storage();
        let account = wallet(&storage, 500);
        let service = RecurringService::new(&storage);
        let rec = service.create(rent(account.id, 5)).unwrap();
        service.process_due(date(2025, 3, 5)).unwrap();

        service.delete(rec.id).unwrap();
        assert!(service.get(rec.id).unwrap().is_none());
        assert!(service.delete(rec.id).unwrap_err().is_not_found());
        assert_eq!(storage.all::<Transaction>().unwrap().len(), 2);
    }
}
