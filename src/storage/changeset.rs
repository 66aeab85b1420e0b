//! Staged writes of a session
//!
//! Each table gets a map of `id -> Some(row)` (insert or replace) or
//! `id -> None` (delete). Nothing here touches committed state until the
//! changeset is applied during commit.

use std::collections::BTreeMap;

use crate::models::{Account, Category, PlannedPayment, RecurringPayment, Transaction, Transfer};

use super::tables::{Row, Tables};

/// Pending changes to one table
#[derive(Debug)]
pub struct StagedTable<R: Row> {
    rows: BTreeMap<R::Id, Option<R>>,
}

impl<R: Row> Default for StagedTable<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<R: Row> StagedTable<R> {
    /// `Some(Some(row))` if staged, `Some(None)` if staged for deletion,
    /// `None` if this table has no opinion about `id`
    pub fn get(&self, id: R::Id) -> Option<Option<&R>> {
        self.rows.get(&id).map(Option::as_ref)
    }

    pub fn put(&mut self, row: R) {
        self.rows.insert(row.id(), Some(row));
    }

    pub fn remove(&mut self, id: R::Id) {
        self.rows.insert(id, None);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The committed rows as this session sees them, in id order
    pub fn overlay(&self, committed: &BTreeMap<R::Id, R>) -> Vec<R> {
        let mut merged: BTreeMap<R::Id, R> = committed
            .iter()
            .filter(|(id, _)| !self.rows.contains_key(id))
            .map(|(id, row)| (*id, row.clone()))
            .collect();
        for (id, row) in &self.rows {
            if let Some(row) = row {
                merged.insert(*id, row.clone());
            }
        }
        merged.into_values().collect()
    }

    fn apply_to(self, table: &mut BTreeMap<R::Id, R>) {
        for (id, row) in self.rows {
            match row {
                Some(row) => {
                    table.insert(id, row);
                }
                None => {
                    table.remove(&id);
                }
            }
        }
    }
}

/// All staged writes of one session
#[derive(Debug, Default)]
pub struct Changeset {
    pub(crate) accounts: StagedTable<Account>,
    pub(crate) transactions: StagedTable<Transaction>,
    pub(crate) transfers: StagedTable<Transfer>,
    pub(crate) recurring_payments: StagedTable<RecurringPayment>,
    pub(crate) planned_payments: StagedTable<PlannedPayment>,
    pub(crate) categories: StagedTable<Category>,
}

impl Changeset {
    /// Number of staged row changes
    pub fn len(&self) -> usize {
        self.accounts.len()
            + self.transactions.len()
            + self.transfers.len()
            + self.recurring_payments.len()
            + self.planned_payments.len()
            + self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every staged change to `tables`
    pub fn apply_to(self, tables: &mut Tables) {
        self.accounts.apply_to(&mut tables.accounts);
        self.transactions.apply_to(&mut tables.transactions);
        self.transfers.apply_to(&mut tables.transfers);
        self.recurring_payments
            .apply_to(&mut tables.recurring_payments);
        self.planned_payments.apply_to(&mut tables.planned_payments);
        self.categories.apply_to(&mut tables.categories);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, AccountType};

    fn account(id: i64, name: &str) -> Account {
        Account::new(AccountId::new(id), name, AccountType::Cash)
    }

    #[test]
    fn test_overlay_applies_puts_and_removes() {
        let mut committed = BTreeMap::new();
        committed.insert(AccountId::new(1), account(1, "Wallet"));
        committed.insert(AccountId::new(2), account(2, "Card"));

        let mut staged = StagedTable::default();
        staged.remove(AccountId::new(1));
        staged.put(account(2, "Debit Card"));
        staged.put(account(3, "Savings"));

        let view = staged.overlay(&committed);
        let names: Vec<_> = view.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Debit Card", "Savings"]);
        // Committed rows are untouched
        assert_eq!(committed.len(), 2);
    }

    #[test]
    fn test_get_distinguishes_deleted_from_unknown() {
        let mut staged: StagedTable<Account> = StagedTable::default();
        staged.remove(AccountId::new(1));
        assert!(matches!(staged.get(AccountId::new(1)), Some(None)));
        assert!(staged.get(AccountId::new(2)).is_none());
    }

    #[test]
    fn test_apply_to_tables() {
        let mut tables = Tables::default();
        tables.accounts.insert(AccountId::new(1), account(1, "Wallet"));

        let mut changes = Changeset::default();
        changes.accounts.remove(AccountId::new(1));
        changes.accounts.put(account(2, "Card"));
        assert_eq!(changes.len(), 2);

        changes.apply_to(&mut tables);
        assert!(!tables.accounts.contains_key(&AccountId::new(1)));
        assert_eq!(tables.accounts[&AccountId::new(2)].name, "Card");
    }
}
