//! Transaction service
//!
//! Records income and expenses against an account and keeps the account's
//! balance in step with every insert, edit and delete of its transactions.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::transaction::{local_now, CorrectionError};
use crate::models::{
    apply_correction, Account, AccountId, Money, Transaction, TransactionId, TransactionType,
};
use crate::storage::{Session, Storage};

/// Service for income/expense entries
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Input for recording an income or expense
#[derive(Debug, Clone)]
pub struct EntryInput {
    pub account_id: AccountId,
    /// Unsigned amount; must be positive
    pub amount: Money,
    pub description: String,
    pub category: String,
    /// When the money moved; defaults to now
    pub at: Option<NaiveDateTime>,
}

impl EntryInput {
    pub fn new(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            amount,
            description: String::new(),
            category: String::new(),
            at: None,
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

    pub fn at(mut self, at: NaiveDateTime) -> Self {
        self.at = Some(at);
        self
    }
}

/// Changes to apply to an existing transaction; `None` keeps the old value
#[derive(Debug, Clone, Default)]
pub struct TransactionEdit {
    /// New unsigned amount; the sign follows the transaction's type
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl TransactionEdit {
    pub fn new() -> Self {
        Self::default()
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
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by account
    pub account_id: Option<AccountId>,
    /// First calendar day to include
    pub start_date: Option<NaiveDate>,
    /// Last calendar day to include
    pub end_date: Option<NaiveDate>,
    /// Filter by income/expense
    pub transaction_type: Option<TransactionType>,
    /// Filter by category name (case-insensitive)
    pub category: Option<String>,
    /// Maximum number of transactions to return
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        let day = txn.transaction_date.date();
        self.account_id.map_or(true, |id| txn.account_id == id)
            && self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
            && self
                .transaction_type
                .map_or(true, |kind| txn.transaction_type == kind)
            && self
                .category
                .as_ref()
                .map_or(true, |c| txn.category.to_lowercase() == c.to_lowercase())
    }
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record money coming into an account
    pub fn record_income(&self, input: EntryInput) -> LedgerResult<Transaction> {
        self.record(TransactionType::Income, input)
    }

    /// Record money leaving an account; refused if the balance cannot cover it
    pub fn record_expense(&self, input: EntryInput) -> LedgerResult<Transaction> {
        self.record(TransactionType::Expense, input)
    }

    fn record(&self, kind: TransactionType, input: EntryInput) -> LedgerResult<Transaction> {
        ensure_positive(input.amount)?;

        let mut session = self.storage.begin_locked(&[input.account_id])?;
        let txn = record_entry(&mut session, kind, input)?;
        session.commit()?;

        info!(
            id = %txn.id,
            account = %txn.account_id,
            amount = %txn.amount,
            "Recorded {}",
            kind
        );
        Ok(txn)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        self.storage.get(id)
    }

    /// Find a transaction by its ID string (`txn-12` or `12`)
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Transaction>> {
        match identifier.parse::<TransactionId>() {
            Ok(id) => self.get(id),
            Err(_) => Ok(None),
        }
    }

    /// List transactions matching `filter`, newest first
    pub fn list(&self, filter: TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = self.storage.read(|tables| {
            tables
                .transactions
                .values()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect()
        })?;

        transactions.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.id.cmp(&a.id))
        });

        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    /// Edit a transaction, re-deriving its effect on the account balance
    ///
    /// The income/expense type never changes. A larger expense is refused if
    /// the account could not have afforded it in the first place.
    pub fn edit(&self, id: TransactionId, edit: TransactionEdit) -> LedgerResult<Transaction> {
        if let Some(amount) = edit.amount {
            ensure_positive(amount)?;
        }

        let snapshot = self.storage.require::<Transaction>(id)?;
        let mut session = self.storage.begin_locked(&[snapshot.account_id])?;
        let before: Transaction = session.require(id)?;
        let mut after = before.clone();

        if let Some(amount) = edit.amount {
            let account: Account = session.require(before.account_id)?;
            let correction = apply_correction(before.amount, amount, account.balance)
                .map_err(|e| correction_error(e, &account))?;
            let updated = session.adjust_balance(account.id, correction.amount - before.amount)?;
            debug_assert_eq!(updated.balance, correction.balance);
            after.amount = correction.amount;
        }
        if let Some(description) = edit.description {
            after.description = description;
        }
        if let Some(category) = edit.category {
            after.category = category;
        }

        if after == before {
            return Ok(before);
        }

        after.validate()?;
        session.update(&before, after.clone());
        session.commit()?;

        info!(id = %id, from = %before.amount, to = %after.amount, "Edited transaction");
        Ok(after)
    }

    /// Delete a transaction, reversing its effect on the account balance
    ///
    /// Deleting an income may leave the balance negative.
    pub fn delete(&self, id: TransactionId) -> LedgerResult<Transaction> {
        let snapshot = self.storage.require::<Transaction>(id)?;
        let mut session = self.storage.begin_locked(&[snapshot.account_id])?;
        let txn: Transaction = session.require(id)?;

        session.adjust_balance(txn.account_id, -txn.amount)?;
        session.delete(&txn);
        session.commit()?;

        info!(id = %id, amount = %txn.amount, "Deleted transaction");
        Ok(txn)
    }

    /// Count all transactions
    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.read(|tables| tables.transactions.len())
    }
}

/// Stage an income or expense in an open session
///
/// The session must hold the lock of `input.account_id`. Used directly by
/// the schedulers so their own state change lands in the same commit.
pub(crate) fn record_entry(
    session: &mut Session<'_>,
    kind: TransactionType,
    input: EntryInput,
) -> LedgerResult<Transaction> {
    ensure_positive(input.amount)?;

    let account: Account = session.require(input.account_id)?;
    if kind == TransactionType::Expense && account.balance < input.amount {
        return Err(LedgerError::InsufficientFunds {
            account: account.name,
            needed: input.amount,
            available: account.balance,
        });
    }

    let id = session.next_id::<Transaction>()?;
    let mut txn = Transaction::new(
        id,
        account.id,
        kind,
        input.amount,
        input.at.unwrap_or_else(local_now),
    );
    txn.description = input.description.trim().to_string();
    txn.category = input.category.trim().to_string();
    txn.validate()?;

    session.adjust_balance(account.id, txn.amount)?;
    session.insert(txn.clone());
    Ok(txn)
}

pub(crate) fn ensure_positive(amount: Money) -> LedgerResult<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::InvalidRange(format!(
            "Amount must be positive, got {}",
            amount
        )))
    }
}

fn correction_error(err: CorrectionError, account: &Account) -> LedgerError {
    match err {
        CorrectionError::NonPositiveAmount(amount) => {
            LedgerError::InvalidRange(format!("Amount must be positive, got {}", amount))
        }
        CorrectionError::BalanceOverflow => LedgerError::InvalidRange(format!(
            "Balance of '{}' would overflow",
            account.name
        )),
        CorrectionError::InsufficientFunds { needed, available } => {
            LedgerError::InsufficientFunds {
                account: account.name.clone(),
                needed,
                available,
            }
        }
    }
}
