//! Service layer for Pocketbook
//!
//! The service layer provides the ledger operations on top of the storage
//! layer: validation, balance bookkeeping, locking and logging. Every
//! mutating call is one session and one commit.

pub mod account;
pub mod category;
pub mod planned;
pub mod recurring;
pub mod transaction;
pub mod transfer;

pub use account::{AccountReferences, AccountService, BalanceCheck};
pub use category::CategoryService;
pub use planned::{PlannedEdit, PlannedFilter, PlannedInput, PlannedService};
pub use recurring::{
    RecurringInput, RecurringOutcome, RecurringService, RecurringSummary, RecurringUpdate,
};
pub use transaction::{EntryInput, TransactionEdit, TransactionFilter, TransactionService};
pub use transfer::{TransferInput, TransferService};

use crate::error::LedgerResult;
use crate::models::AccountId;
use crate::storage::{Row, Session, Storage};

/// Open a session holding the lock of the account that owns row `id`
///
/// `also` names another account to lock in the same acquisition, used when
/// the row is being moved. The row is re-read under the lock; if its owner
/// changed in between, the locks are dropped and taken again.
pub(crate) fn begin_for_owner<'s, R: Row>(
    storage: &'s Storage,
    id: R::Id,
    owner: impl Fn(&R) -> AccountId,
    also: Option<AccountId>,
) -> LedgerResult<(Session<'s>, R)> {
    loop {
        let snapshot: R = storage.require(id)?;
        let expected = owner(&snapshot);

        let mut accounts = vec![expected];
        accounts.extend(also);
        let session = storage.begin_locked(&accounts)?;

        let current: R = session.require(id)?;
        if owner(&current) == expected {
            return Ok((session, current));
        }
    }
}
