//! Storage layer for Pocketbook
//!
//! The ledger is one JSON document (`data/ledger.json`) loaded into memory
//! behind a `RwLock`. Queries read a consistent snapshot; writes go through a
//! `Session` and are persisted atomically on commit, after which the new
//! state is swapped in.

pub mod changeset;
pub mod file_io;
pub mod init;
pub mod locks;
pub mod session;
pub mod tables;

pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use locks::AccountLocks;
pub use session::Session;
pub use tables::{Row, Tables};

use std::sync::RwLock;

use tracing::{debug, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::AccountId;

use changeset::Changeset;
use tables::LedgerFile;

/// The ledger store
pub struct Storage {
    paths: LedgerPaths,
    tables: RwLock<Tables>,
    locks: AccountLocks,
    audit: AuditLogger,
}

impl Storage {
    /// Open the store under `paths`, loading the ledger document if present
    pub fn new(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        let file: LedgerFile = read_json(paths.ledger_file())?;
        let tables = Tables::from_file(file)?;
        debug!(
            accounts = tables.accounts.len(),
            transactions = tables.transactions.len(),
            "Ledger loaded"
        );

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            locks: AccountLocks::new(),
            tables: RwLock::new(tables),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Get the audit log
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Check if the ledger has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Run a query against one consistent snapshot of committed state
    pub fn read<T>(&self, query: impl FnOnce(&Tables) -> T) -> LedgerResult<T> {
        let tables = self
            .tables
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(query(&tables))
    }

    /// Get a committed row by id
    pub fn get<R: Row>(&self, id: R::Id) -> LedgerResult<Option<R>> {
        self.read(|tables| R::table(tables).get(&id).cloned())
    }

    /// Get a committed row or fail with the table's not-found error
    pub fn require<R: Row>(&self, id: R::Id) -> LedgerResult<R> {
        self.get(id)?.ok_or_else(|| R::not_found(id))
    }

    /// All committed rows of a table, in id order
    pub fn all<R: Row>(&self) -> LedgerResult<Vec<R>> {
        self.read(|tables| R::table(tables).values().cloned().collect())
    }

    /// Start a unit of work that does not touch balances
    pub fn begin(&self) -> Session<'_> {
        Session::new(self, None)
    }

    /// Start a unit of work holding the locks of `accounts`
    ///
    /// Blocks until every lock is available.
    pub fn begin_locked(&self, accounts: &[AccountId]) -> LedgerResult<Session<'_>> {
        let guard = self.locks.acquire(accounts)?;
        Ok(Session::new(self, Some(guard)))
    }

    pub(crate) fn next_id<R: Row>(&self) -> LedgerResult<R::Id> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let sequence = R::sequence(&mut tables.sequences);
        *sequence += 1;
        Ok(R::Id::from(*sequence))
    }

    pub(crate) fn commit(&self, changes: Changeset, audit: Vec<AuditEntry>) -> LedgerResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let staged = changes.len();

        {
            let mut tables = self
                .tables
                .write()
                .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

            let mut next = tables.clone();
            changes.apply_to(&mut next);
            next.check_constraints()?;
            write_json_atomic(self.paths.ledger_file(), &next.to_file())?;
            *tables = next;
        }
        debug!(rows = staged, "Ledger session committed");

        if let Err(e) = self.audit.log_batch(&audit) {
            warn!(error = %e, "Failed to append audit entries");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Money};
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
        assert!(storage.all::<Account>().unwrap().is_empty());
    }

    #[test]
    fn test_reload_reproduces_state() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let id = {
            let storage = Storage::new(paths.clone()).unwrap();
            let mut session = storage.begin();
            let id = session.next_id::<Account>().unwrap();
            let mut account = Account::new(id, "Savings", AccountType::Savings);
            account.balance = Money::from_major(10);
            session.insert(account);
            session.commit().unwrap();
            id
        };

        let storage = Storage::new(paths).unwrap();
        let account = storage.require::<Account>(id).unwrap();
        assert_eq!(account.name, "Savings");
        assert_eq!(account.balance, Money::from_major(10));

        // Ids keep counting from the persisted sequence
        let next = storage.next_id::<Account>().unwrap();
        assert!(next > id);
    }

    #[test]
    fn test_ids_are_unique_per_table() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let a = storage.next_id::<Account>().unwrap();
        let b = storage.next_id::<Account>().unwrap();
        assert_ne!(a, b);
        assert_eq!(a, AccountId::new(1));
    }

    #[test]
    fn test_missing_row_error_names_the_table() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let err = storage.require::<Account>(AccountId::new(42)).unwrap_err();
        assert_eq!(err.to_string(), "Account not found: acc-42");
    }
}
