//! Transfer service
//!
//! Moves money between two of the user's accounts. A transfer is two balance
//! deltas plus one `Transfer` record, committed together; it creates no
//! transactions.

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::transaction::local_now;
use crate::models::{Account, AccountId, Money, Transfer, TransferId};
use crate::storage::Storage;

use super::transaction::ensure_positive;

/// Service for managing transfers between accounts
pub struct TransferService<'a> {
    storage: &'a Storage,
}

/// Input for a new transfer
#[derive(Debug, Clone)]
pub struct TransferInput {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Money,
    pub description: String,
    pub at: Option<NaiveDateTime>,
}

impl TransferInput {
    pub fn new(from_account_id: AccountId, to_account_id: AccountId, amount: Money) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            description: String::new(),
            at: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn at(mut self, at: NaiveDateTime) -> Self {
        self.at = Some(at);
        self
    }
}

impl<'a> TransferService<'a> {
    /// Create a new transfer service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Move `amount` from one account to another
    ///
    /// Checks, in order: the amount is positive, the accounts differ, both
    /// exist, and the source balance covers the amount.
    pub fn transfer(&self, input: TransferInput) -> LedgerResult<Transfer> {
        ensure_positive(input.amount)?;

        if input.from_account_id == input.to_account_id {
            return Err(LedgerError::SameAccount(input.from_account_id.to_string()));
        }

        let mut session = self
            .storage
            .begin_locked(&[input.from_account_id, input.to_account_id])?;
        let from: Account = session.require(input.from_account_id)?;
        let to: Account = session.require(input.to_account_id)?;

        if from.balance < input.amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.name,
                needed: input.amount,
                available: from.balance,
            });
        }

        session.adjust_balance(from.id, -input.amount)?;
        session.adjust_balance(to.id, input.amount)?;

        let transfer = Transfer {
            id: session.next_id::<Transfer>()?,
            from_account_id: from.id,
            to_account_id: to.id,
            amount: input.amount,
            description: input.description.trim().to_string(),
            transfer_date: input.at.unwrap_or_else(local_now),
        };
        session.insert(transfer.clone());
        session.commit()?;

        info!(
            id = %transfer.id,
            from = %from.name,
            to = %to.name,
            amount = %transfer.amount,
            "Transferred"
        );
        Ok(transfer)
    }

    /// Get a transfer by ID
    pub fn get(&self, id: TransferId) -> LedgerResult<Option<Transfer>> {
        self.storage.get(id)
    }

    /// List transfers, optionally only those touching `account_id`, newest first
    pub fn list(&self, account_id: Option<AccountId>) -> LedgerResult<Vec<Transfer>> {
        let mut transfers: Vec<Transfer> = self.storage.read(|tables| {
            tables
                .transfers
                .values()
                .filter(|t| account_id.map_or(true, |id| t.involves(id)))
                .cloned()
                .collect()
        })?;

        transfers.sort_by(|a, b| b.transfer_date.cmp(&a.transfer_date).then(b.id.cmp(&a.id)));
        Ok(transfers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerPaths;
    use crate::models::{AccountType, Transaction};
    use crate::services::AccountService;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn create_account(storage: &Storage, name: &str, initial: i64) -> Account {
        AccountService::new(storage)
            .create(name, AccountType::Cash, Money::from_major(initial))
            .unwrap()
    }

    fn balance(storage: &Storage, id: AccountId) -> Money {
        storage.require::<Account>(id).unwrap().balance
    }

    #[test]
    fn test_transfer_moves_money() {
        let (_temp_dir, storage) = create_test_storage();
        let a = create_account(&storage, "A", 1000);
        let b = create_account(&storage, "B", 0);
        let service = TransferService::new(&storage);

        let transfer = service
            .transfer(TransferInput::new(a.id, b.id, Money::from_major(300)).description("rent"))
            .unwrap();

        assert_eq!(transfer.amount, Money::from_major(300));
        assert_eq!(transfer.description, "rent");
        assert_eq!(balance(&storage, a.id), Money::from_major(700));
        assert_eq!(balance(&storage, b.id), Money::from_major(300));

        // Only the opening balance is a transaction
        assert_eq!(storage.all::<Transaction>().unwrap().len(), 1);
    }

    #[test]
    fn test_transfer_rejections_leave_state_unchanged() {
        let (_temp_dir, storage) = create_test_storage();
        let a = create_account(&storage, "A", 100);
        let b = create_account(&storage, "B", 0);
        let service = TransferService::new(&storage);

        assert!(matches!(
            service.transfer(TransferInput::new(a.id, b.id, Money::zero())),
            Err(LedgerError::InvalidRange(_))
        ));
        assert!(matches!(
            service.transfer(TransferInput::new(a.id, a.id, Money::from_major(1))),
            Err(LedgerError::SameAccount(_))
        ));
        assert!(service
            .transfer(TransferInput::new(a.id, AccountId::new(99), Money::from_major(1)))
            .unwrap_err()
            .is_not_found());
        assert!(service
            .transfer(TransferInput::new(b.id, a.id, Money::from_major(1)))
            .unwrap_err()
            .is_insufficient_funds());

        assert_eq!(balance(&storage, a.id), Money::from_major(100));
        assert_eq!(balance(&storage, b.id), Money::zero());
        assert!(service.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_amount_checked_before_same_account() {
        let (_temp_dir, storage) = create_test_storage();
        let a = create_account(&storage, "A", 100);
        let result = TransferService::new(&storage).transfer(TransferInput::new(
            a.id,
            a.id,
            Money::from_major(-5),
        ));
        assert!(matches!(result, Err(LedgerError::InvalidRange(_))));
    }

    #[test]
    fn test_list_newest_first_and_by_account() {
        let (_temp_dir, storage) = create_test_storage();
        let a = create_account(&storage, "A", 100);
        let b = create_account(&storage, "B", 0);
        let c = create_account(&storage, "C", 0);
        let service = TransferService::new(&storage);
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 3, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        };

        service
            .transfer(TransferInput::new(a.id, b.id, Money::from_major(10)).at(day(1)))
            .unwrap();
        service
            .transfer(TransferInput::new(a.id, c.id, Money::from_major(10)).at(day(5)))
            .unwrap();

        let all = service.list(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].to_account_id, c.id);

        let for_b = service.list(Some(b.id)).unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(service.get(for_b[0].id).unwrap().unwrap(), for_b[0]);
    }
}
