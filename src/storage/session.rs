//! Scoped units of work against the ledger store
//!
//! A `Session` stages writes and the matching audit entries. Reads through
//! the session see its own staged rows first, then committed state. Nothing
//! becomes visible to anyone else until `commit` succeeds; dropping the
//! session discards everything it staged and releases its account locks.

use tracing::trace;

use crate::audit::AuditEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountId, Money};

use super::changeset::Changeset;
use super::locks::AccountLockGuard;
use super::tables::Row;
use super::Storage;

/// One atomic unit of work
pub struct Session<'a> {
    storage: &'a Storage,
    changes: Changeset,
    audit: Vec<AuditEntry>,
    locks: Option<AccountLockGuard<'a>>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(storage: &'a Storage, locks: Option<AccountLockGuard<'a>>) -> Self {
        Self {
            storage,
            changes: Changeset::default(),
            audit: Vec::new(),
            locks,
        }
    }

    /// Read a row, preferring this session's staged version
    pub fn get<R: Row>(&self, id: R::Id) -> LedgerResult<Option<R>> {
        if let Some(staged) = R::staged(&self.changes).get(id) {
            return Ok(staged.cloned());
        }
        self.storage.get(id)
    }

    /// Read a row or fail with the table's not-found error
    pub fn require<R: Row>(&self, id: R::Id) -> LedgerResult<R> {
        self.get(id)?.ok_or_else(|| R::not_found(id))
    }

    /// All rows of a table as this session sees them, in id order
    pub fn rows<R: Row>(&self) -> LedgerResult<Vec<R>> {
        self.storage
            .read(|tables| R::staged(&self.changes).overlay(R::table(tables)))
    }

    /// Allocate the next identifier of a table
    pub fn next_id<R: Row>(&self) -> LedgerResult<R::Id> {
        self.storage.next_id::<R>()
    }

    /// Stage a new row
    pub fn insert<R: Row>(&mut self, row: R) {
        self.audit.push(AuditEntry::create(
            R::ENTITY,
            row.id().to_string(),
            label_of(&row),
            &row,
        ));
        R::staged_mut(&mut self.changes).put(row);
    }

    /// Stage a replacement of `before` by `after`
    pub fn update<R: Row>(&mut self, before: &R, after: R) {
        self.audit.push(AuditEntry::update(
            R::ENTITY,
            after.id().to_string(),
            label_of(&after),
            before,
            &after,
        ));
        R::staged_mut(&mut self.changes).put(after);
    }

    /// Stage the removal of a row
    pub fn delete<R: Row>(&mut self, row: &R) {
        self.delete_noted(row, None);
    }

    /// Stage the removal of a row, recording a note in its audit entry
    pub fn delete_noted<R: Row>(&mut self, row: &R, note: Option<String>) {
        let mut entry = AuditEntry::delete(R::ENTITY, row.id().to_string(), label_of(row), row);
        if let Some(note) = note {
            entry = entry.with_summary(note);
        }
        self.audit.push(entry);
        R::staged_mut(&mut self.changes).remove(row.id());
    }

    /// Add `delta` to an account's balance and return the updated row
    ///
    /// The account must be locked by this session.
    pub fn adjust_balance(&mut self, account_id: AccountId, delta: Money) -> LedgerResult<Account> {
        debug_assert!(
            self.holds_lock(account_id),
            "balance of {} changed without its lock",
            account_id
        );

        let before: Account = self.require(account_id)?;
        let mut after = before.clone();
        after.balance = before.balance.checked_add(delta).ok_or_else(|| {
            LedgerError::InvalidRange(format!(
                "Balance of '{}' would overflow: {} + {}",
                before.name, before.balance, delta
            ))
        })?;
        trace!(account = %account_id, from = %before.balance, to = %after.balance, "Balance staged");
        self.update(&before, after.clone());
        Ok(after)
    }

    /// Whether this session holds the lock of `account_id`
    pub fn holds_lock(&self, account_id: AccountId) -> bool {
        self.locks
            .as_ref()
            .map(|guard| guard.ids().contains(&account_id))
            .unwrap_or(false)
    }

    /// Whether anything has been staged
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Apply all staged writes atomically, then release the account locks
    pub fn commit(self) -> LedgerResult<()> {
        let Session {
            storage,
            changes,
            audit,
            locks,
        } = self;

        let result = storage.commit(changes, audit);
        drop(locks);
        result
    }
}

fn label_of<R: Row>(row: &R) -> Option<String> {
    let label = row.label().trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}
