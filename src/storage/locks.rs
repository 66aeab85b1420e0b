//! Per-account locks
//!
//! Every balance-affecting unit of work holds the locks of the accounts it
//! touches until it commits or is dropped. Locks are always taken one at a
//! time in ascending id order, so two units that need the same pair of
//! accounts can never wait on each other in a cycle.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use tracing::trace;

use crate::error::{LedgerError, LedgerResult};
use crate::models::AccountId;

/// Registry of currently held account locks
#[derive(Debug, Default)]
pub struct AccountLocks {
    held: Mutex<HashSet<AccountId>>,
    released: Condvar,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until every account in `ids` is held by the caller.
    ///
    /// Duplicates are collapsed. The returned guard releases the locks when
    /// dropped.
    pub fn acquire(&self, ids: &[AccountId]) -> LedgerResult<AccountLockGuard<'_>> {
        let mut ordered = ids.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut guard = AccountLockGuard {
            locks: self,
            ids: Vec::with_capacity(ordered.len()),
        };

        for id in ordered {
            let mut held = self.held.lock().map_err(|e| {
                LedgerError::Storage(format!("Failed to acquire account lock table: {}", e))
            })?;
            while held.contains(&id) {
                held = self.released.wait(held).map_err(|e| {
                    LedgerError::Storage(format!("Failed to wait for account lock: {}", e))
                })?;
            }
            held.insert(id);
            guard.ids.push(id);
            trace!(account = %id, "Account lock acquired");
        }

        Ok(guard)
    }

    /// Whether any session currently holds the lock on `id`
    pub fn is_held(&self, id: AccountId) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(&id))
            .unwrap_or(false)
    }
}

/// Held account locks; released on drop
#[derive(Debug)]
pub struct AccountLockGuard<'a> {
    locks: &'a AccountLocks,
    ids: Vec<AccountId>,
}

impl AccountLockGuard<'_> {
    /// The locked accounts, ascending
    pub fn ids(&self) -> &[AccountId] {
        &self.ids
    }
}

impl Drop for AccountLockGuard<'_> {
    fn drop(&mut self) {
        if self.ids.is_empty() {
            return;
        }

        let mut held = match self.locks.held.lock() {
            Ok(held) => held,
            Err(poisoned) => poisoned.into_inner(),
        };
        for id in &self.ids {
            held.remove(id);
        }
        drop(held);
        self.locks.released.notify_all();
    }
}
