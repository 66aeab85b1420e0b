//! Account service
//!
//! Creates, renames, retypes and deletes accounts, and recomputes balances
//! from the ledger to check them against what is stored.

use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountId, AccountType, Money, TransactionType};
use crate::storage::{Storage, Tables};

use super::transaction::{record_entry, EntryInput};

/// Description and category of the income that carries an initial balance
pub const OPENING_BALANCE: &str = "Opening balance";

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// Stored versus ledger-derived balance of one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCheck {
    pub account_id: AccountId,
    pub name: String,
    pub stored: Money,
    /// Sum of transactions plus incoming minus outgoing transfers
    pub derived: Money,
}

impl BalanceCheck {
    pub fn is_consistent(&self) -> bool {
        self.stored == self.derived
    }
}

/// Rows that still point at an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountReferences {
    pub transactions: usize,
    pub transfers: usize,
    pub recurring: usize,
    pub planned: usize,
}

impl AccountReferences {
    fn count(tables: &Tables, id: AccountId) -> Self {
        Self {
            transactions: tables
                .transactions
                .values()
                .filter(|t| t.account_id == id)
                .count(),
            transfers: tables.transfers.values().filter(|t| t.involves(id)).count(),
            recurring: tables
                .recurring_payments
                .values()
                .filter(|r| r.account_id == id)
                .count(),
            planned: tables
                .planned_payments
                .values()
                .filter(|p| p.account_id == id)
                .count(),
        }
    }

    /// Whether anything other than transactions still references the account
    pub fn has_dangling(&self) -> bool {
        self.transfers + self.recurring + self.planned > 0
    }
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account
    ///
    /// A positive `initial_balance` is recorded as an income transaction in
    /// the same commit, so the balance is always backed by the ledger.
    pub fn create(
        &self,
        name: &str,
        account_type: AccountType,
        initial_balance: Money,
    ) -> LedgerResult<Account> {
        if initial_balance.is_negative() {
            return Err(LedgerError::InvalidRange(format!(
                "Initial balance cannot be negative, got {}",
                initial_balance
            )));
        }

        if self.get_by_name(name)?.is_some() {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.trim().to_string(),
            });
        }

        let id = self.storage.next_id::<Account>()?;
        let account = Account::new(id, name, account_type);
        account.validate()?;

        let mut session = self.storage.begin_locked(&[id])?;
        session.insert(account);
        if initial_balance.is_positive() {
            record_entry(
                &mut session,
                TransactionType::Income,
                EntryInput::new(id, initial_balance)
                    .description(OPENING_BALANCE)
                    .category(OPENING_BALANCE),
            )?;
        }
        let account: Account = session.require(id)?;
        session.commit()?;

        info!(id = %account.id, name = %account.name, balance = %account.balance, "Created account");
        Ok(account)
    }

    /// Get an account by ID
    pub fn get(&self, id: AccountId) -> LedgerResult<Option<Account>> {
        self.storage.get(id)
    }

    /// Get an account by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> LedgerResult<Option<Account>> {
        let key = name.trim().to_lowercase();
        self.storage.read(|tables| {
            tables
                .accounts
                .values()
                .find(|a| a.name_key() == key)
                .cloned()
        })
    }

    /// Find an account by name or ID string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Account>> {
        if let Some(account) = self.get_by_name(identifier)? {
            return Ok(Some(account));
        }

        match identifier.parse::<AccountId>() {
            Ok(id) => self.get(id),
            Err(_) => Ok(None),
        }
    }

    /// All accounts, sorted by name
    pub fn list(&self) -> LedgerResult<Vec<Account>> {
        let mut accounts = self.storage.all::<Account>()?;
        accounts.sort_by_key(|a| a.name_key());
        Ok(accounts)
    }

    /// Sum of all account balances
    pub fn total_balance(&self) -> LedgerResult<Money> {
        self.storage
            .read(|tables| tables.accounts.values().map(|a| a.balance).sum())
    }

    /// Rename and/or retype an account; the balance is never touched
    pub fn update(
        &self,
        id: AccountId,
        name: Option<&str>,
        account_type: Option<AccountType>,
    ) -> LedgerResult<Account> {
        let mut session = self.storage.begin_locked(&[id])?;
        let before: Account = session.require(id)?;
        let mut after = before.clone();

        if let Some(name) = name {
            let name = name.trim();
            if let Some(existing) = self.get_by_name(name)? {
                if existing.id != id {
                    return Err(LedgerError::Duplicate {
                        entity_type: "Account",
                        identifier: name.to_string(),
                    });
                }
            }
            after.name = name.to_string();
        }
        if let Some(account_type) = account_type {
            after.account_type = account_type;
        }

        after.validate()?;
        if after == before {
            return Ok(before);
        }

        session.update(&before, after.clone());
        session.commit()?;

        info!(id = %id, name = %after.name, kind = %after.account_type, "Updated account");
        Ok(after)
    }

    /// Delete an account that owns no transactions
    ///
    /// Transfers and scheduled payments that still reference the account do
    /// not block deletion; they are left in place and reported.
    pub fn delete(&self, id: AccountId) -> LedgerResult<Account> {
        let mut session = self.storage.begin_locked(&[id])?;
        let account: Account = session.require(id)?;

        let refs = self.storage.read(|tables| AccountReferences::count(tables, id))?;
        if refs.transactions > 0 {
            return Err(LedgerError::HasTransactions {
                account: account.name,
                count: refs.transactions,
            });
        }

        let note = if refs.has_dangling() {
            warn!(
                id = %id,
                transfers = refs.transfers,
                recurring = refs.recurring,
                planned = refs.planned,
                "Deleting account that is still referenced"
            );
            Some(format!(
                "still referenced by {} transfer(s), {} recurring payment(s), {} planned payment(s)",
                refs.transfers, refs.recurring, refs.planned
            ))
        } else {
            None
        };

        session.delete_noted(&account, note);
        session.commit()?;

        info!(id = %id, name = %account.name, "Deleted account");
        Ok(account)
    }

    /// Count the rows that reference an account
    pub fn references(&self, id: AccountId) -> LedgerResult<AccountReferences> {
        self.storage.read(|tables| AccountReferences::count(tables, id))
    }

    /// Recompute every account's balance from its ledger history
    pub fn verify_balances(&self) -> LedgerResult<Vec<BalanceCheck>> {
        self.storage.read(|tables| {
            tables
                .accounts
                .values()
                .map(|account| {
                    let from_transactions: Money = tables
                        .transactions
                        .values()
                        .filter(|t| t.account_id == account.id)
                        .map(|t| t.amount)
                        .sum();
                    let from_transfers: Money = tables
                        .transfers
                        .values()
                        .map(|t| t.effect_on(account.id))
                        .sum();

                    BalanceCheck {
                        account_id: account.id,
                        name: account.name.clone(),
                        stored: account.balance,
                        derived: from_transactions + from_transfers,
                    }
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerPaths;
    use crate::models::Transaction;
    use crate::services::{TransactionService, TransferInput, TransferService};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_account_with_opening_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        let account = service
            .create("Savings", AccountType::Savings, Money::from_major(1000))
            .unwrap();

        assert_eq!(account.name, "Savings");
        assert_eq!(account.balance, Money::from_major(1000));

        let txns = storage.all::<Transaction>().unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, Money::from_major(1000));
        assert_eq!(txns[0].category, OPENING_BALANCE);
        assert!(service.verify_balances().unwrap()[0].is_consistent());
    }

    #[test]
    fn test_create_without_balance_records_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let account = AccountService::new(&storage)
            .create("Wallet", AccountType::Cash, Money::zero())
            .unwrap();
        assert_eq!(account.balance, Money::zero());
        assert!(storage.all::<Transaction>().unwrap().is_empty());
    }

    #[test]
    fn test_create_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        assert!(matches!(
            service.create("  ", AccountType::Cash, Money::zero()),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            service.create("Debt", AccountType::Credit, Money::from_major(-1)),
            Err(LedgerError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_create_duplicate_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        service
            .create("Wallet", AccountType::Cash, Money::zero())
            .unwrap();

        let result = service.create("wallet", AccountType::Debit, Money::zero());
        assert!(matches!(result, Err(LedgerError::Duplicate { .. })));
    }

    #[test]
    fn test_find_account() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        let created = service
            .create("My Card", AccountType::Debit, Money::zero())
            .unwrap();

        assert_eq!(service.find("my card").unwrap().unwrap().id, created.id);
        assert_eq!(
            service.find(&created.id.to_string()).unwrap().unwrap().id,
            created.id
        );
        assert!(service.find("Nope").unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let account = service
            .create("Card", AccountType::Debit, Money::from_major(50))
            .unwrap();
        service
            .create("Wallet", AccountType::Cash, Money::zero())
            .unwrap();

        let updated = service
            .update(account.id, Some("Main Card"), Some(AccountType::Credit))
            .unwrap();
        assert_eq!(updated.name, "Main Card");
        assert_eq!(updated.account_type, AccountType::Credit);
        assert_eq!(updated.balance, Money::from_major(50));

        assert!(matches!(
            service.update(account.id, Some("WALLET"), None),
            Err(LedgerError::Duplicate { .. })
        ));
        // Renaming to a different case of its own name is fine
        assert!(service.update(account.id, Some("main card"), None).is_ok());
    }

    #[test]
    fn test_list_sorted_and_total() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        service
            .create("wallet", AccountType::Cash, Money::from_major(5))
            .unwrap();
        service
            .create("Card", AccountType::Debit, Money::from_major(7))
            .unwrap();

        let names: Vec<_> = service.list().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Card", "wallet"]);
        assert_eq!(service.total_balance().unwrap(), Money::from_major(12));
    }

    #[test]
    fn test_delete_refused_with_transactions() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let account = service
            .create("Wallet", AccountType::Cash, Money::from_major(10))
            .unwrap();

        let err = service.delete(account.id).unwrap_err();
        assert!(matches!(err, LedgerError::HasTransactions { count: 1, .. }));

        let opening = storage.all::<Transaction>().unwrap().remove(0);
        TransactionService::new(&storage).delete(opening.id).unwrap();
        service.delete(account.id).unwrap();
        assert!(service.get(account.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_with_transfers_is_reported() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let a = service
            .create("A", AccountType::Cash, Money::zero())
            .unwrap();
        let b = service
            .create("B", AccountType::Cash, Money::from_major(10))
            .unwrap();
        TransferService::new(&storage)
            .transfer(TransferInput::new(b.id, a.id, Money::from_major(4)))
            .unwrap();

        let refs = service.references(a.id).unwrap();
        assert_eq!(refs.transfers, 1);
        assert_eq!(refs.transactions, 0);

        service.delete(a.id).unwrap();
        let entries = storage.audit().read_all().unwrap();
        let last = entries.last().unwrap();
        assert!(last
            .diff_summary
            .as_deref()
            .unwrap()
            .contains("1 transfer(s)"));
    }
}
