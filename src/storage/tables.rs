//! In-memory tables and the on-disk ledger document
//!
//! Committed state lives in `Tables`, one ordered map per entity. On disk the
//! whole ledger is a single JSON document whose top-level arrays carry the
//! same column names as the rows themselves.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Account, AccountId, Category, CategoryId, CategoryKind, PlannedPayment, PlannedPaymentId,
    RecurringPayment, RecurringPaymentId, Transaction, TransactionId, Transfer, TransferId,
};

use super::changeset::{Changeset, StagedTable};

/// Last allocated identifier per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub accounts: i64,
    #[serde(default)]
    pub transactions: i64,
    #[serde(default)]
    pub transfers: i64,
    #[serde(default)]
    pub recurring_payments: i64,
    #[serde(default)]
    pub planned_payments: i64,
    #[serde(default)]
    pub categories: i64,
}

/// Committed ledger state
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub accounts: BTreeMap<AccountId, Account>,
    pub transactions: BTreeMap<TransactionId, Transaction>,
    pub transfers: BTreeMap<TransferId, Transfer>,
    pub recurring_payments: BTreeMap<RecurringPaymentId, RecurringPayment>,
    pub planned_payments: BTreeMap<PlannedPaymentId, PlannedPayment>,
    /// Both vocabularies; split by `kind` on disk
    pub categories: BTreeMap<CategoryId, Category>,
    pub sequences: Sequences,
}

/// A category row as stored in `expense_categories` / `income_categories`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryRecord {
    id: CategoryId,
    name: String,
}

/// Serializable ledger document
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct LedgerFile {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    recurring_payments: Vec<RecurringPayment>,
    #[serde(default)]
    planned_payments: Vec<PlannedPayment>,
    #[serde(default)]
    transfers: Vec<Transfer>,
    #[serde(default)]
    expense_categories: Vec<CategoryRecord>,
    #[serde(default)]
    income_categories: Vec<CategoryRecord>,
    #[serde(default)]
    sequences: Sequences,
}

impl Tables {
    /// Build tables from a loaded document, repairing sequences that lag
    /// behind the rows actually present
    ///
    /// Both vocabularies share one id space; a category id that appears in
    /// both is rejected rather than silently dropping one of the rows.
    pub(crate) fn from_file(file: LedgerFile) -> LedgerResult<Self> {
        let mut tables = Tables {
            sequences: file.sequences,
            ..Default::default()
        };

        tables.accounts = file.accounts.into_iter().map(|r| (r.id, r)).collect();
        tables.transactions = file.transactions.into_iter().map(|r| (r.id, r)).collect();
        tables.transfers = file.transfers.into_iter().map(|r| (r.id, r)).collect();
        tables.recurring_payments = file
            .recurring_payments
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        tables.planned_payments = file
            .planned_payments
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let expense = file
            .expense_categories
            .into_iter()
            .map(|r| Category::new(r.id, CategoryKind::Expense, r.name));
        let income = file
            .income_categories
            .into_iter()
            .map(|r| Category::new(r.id, CategoryKind::Income, r.name));
        for category in expense.chain(income) {
            if let Some(existing) = tables.categories.get(&category.id) {
                return Err(LedgerError::Storage(format!(
                    "Category id {} is used by both '{}' ({}) and '{}' ({})",
                    category.id, existing.name, existing.kind, category.name, category.kind
                )));
            }
            tables.categories.insert(category.id, category);
        }

        let seq = &mut tables.sequences;
        seq.accounts = seq.accounts.max(max_id(&tables.accounts, |id| id.get()));
        seq.transactions = seq
            .transactions
            .max(max_id(&tables.transactions, |id| id.get()));
        seq.transfers = seq.transfers.max(max_id(&tables.transfers, |id| id.get()));
        seq.recurring_payments = seq
            .recurring_payments
            .max(max_id(&tables.recurring_payments, |id| id.get()));
        seq.planned_payments = seq
            .planned_payments
            .max(max_id(&tables.planned_payments, |id| id.get()));
        seq.categories = seq.categories.max(max_id(&tables.categories, |id| id.get()));

        Ok(tables)
    }

    /// Snapshot the tables as a serializable document
    pub(crate) fn to_file(&self) -> LedgerFile {
        let vocabulary = |kind: CategoryKind| {
            self.categories
                .values()
                .filter(|c| c.kind == kind)
                .map(|c| CategoryRecord {
                    id: c.id,
                    name: c.name.clone(),
                })
                .collect::<Vec<_>>()
        };

        LedgerFile {
            accounts: self.accounts.values().cloned().collect(),
            transactions: self.transactions.values().cloned().collect(),
            recurring_payments: self.recurring_payments.values().cloned().collect(),
            planned_payments: self.planned_payments.values().cloned().collect(),
            transfers: self.transfers.values().cloned().collect(),
            expense_categories: vocabulary(CategoryKind::Expense),
            income_categories: vocabulary(CategoryKind::Income),
            sequences: self.sequences.clone(),
        }
    }

    /// Check the table-level constraints that a commit must not violate
    pub fn check_constraints(&self) -> LedgerResult<()> {
        let mut names = HashSet::new();
        for account in self.accounts.values() {
            if !names.insert(account.name_key()) {
                return Err(LedgerError::Duplicate {
                    entity_type: "Account",
                    identifier: account.name.clone(),
                });
            }
        }

        let mut names = HashSet::new();
        for category in self.categories.values() {
            if !names.insert((category.kind, category.name_key())) {
                return Err(LedgerError::Duplicate {
                    entity_type: "Category",
                    identifier: format!("{} ({})", category.name, category.kind),
                });
            }
        }

        if let Some(orphan) = self
            .transactions
            .values()
            .find(|t| !self.accounts.contains_key(&t.account_id))
        {
            return Err(LedgerError::Storage(format!(
                "Transaction {} references missing account {}",
                orphan.id, orphan.account_id
            )));
        }

        Ok(())
    }
}

fn max_id<K, V>(table: &BTreeMap<K, V>, raw: impl Fn(&K) -> i64) -> i64 {
    table.keys().next_back().map(raw).unwrap_or(0)
}

/// A row type stored in one of the ledger tables
pub trait Row: Clone + fmt::Debug + Serialize {
    type Id: Copy + Ord + fmt::Debug + fmt::Display + From<i64>;

    /// Entity type recorded in the audit log
    const ENTITY: EntityType;

    fn id(&self) -> Self::Id;
    /// Human-readable name for logs (account name, description, ...)
    fn label(&self) -> &str;
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self>;
    fn staged(changes: &Changeset) -> &StagedTable<Self>;
    fn staged_mut(changes: &mut Changeset) -> &mut StagedTable<Self>;
    fn sequence(sequences: &mut Sequences) -> &mut i64;
    fn not_found(id: Self::Id) -> LedgerError;
}

macro_rules! impl_row {
    ($row:ty, $id:ty, $table:ident, $label:ident, $entity:expr, $not_found:path) => {
        impl Row for $row {
            type Id = $id;
            const ENTITY: EntityType = $entity;

            fn id(&self) -> $id {
                self.id
            }

            fn label(&self) -> &str {
                &self.$label
            }

            fn table(tables: &Tables) -> &BTreeMap<$id, Self> {
                &tables.$table
            }

            fn staged(changes: &Changeset) -> &StagedTable<Self> {
                &changes.$table
            }

            fn staged_mut(changes: &mut Changeset) -> &mut StagedTable<Self> {
                &mut changes.$table
            }

            fn sequence(sequences: &mut Sequences) -> &mut i64 {
                &mut sequences.$table
            }

            fn not_found(id: $id) -> LedgerError {
                $not_found(id.to_string())
            }
        }
    };
}

impl_row!(
    Account,
    AccountId,
    accounts,
    name,
    EntityType::Account,
    LedgerError::account_not_found
);
impl_row!(
    Transaction,
    TransactionId,
    transactions,
    description,
    EntityType::Transaction,
    LedgerError::transaction_not_found
);
impl_row!(
    Transfer,
    TransferId,
    transfers,
    description,
    EntityType::Transfer,
    LedgerError::transfer_not_found
);
impl_row!(
    RecurringPayment,
    RecurringPaymentId,
    recurring_payments,
    description,
    EntityType::RecurringPayment,
    LedgerError::recurring_not_found
);
impl_row!(
    PlannedPayment,
    PlannedPaymentId,
    planned_payments,
    description,
    EntityType::PlannedPayment,
    LedgerError::planned_not_found
);
impl_row!(
    Category,
    CategoryId,
    categories,
    name,
    EntityType::Category,
    LedgerError::category_not_found
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Money, TransactionType};
    use chrono::NaiveDate;

    fn tables_with_wallet() -> Tables {
        let mut tables = Tables::default();
        let wallet = Account::new(AccountId::new(1), "Wallet", AccountType::Cash);
        tables.accounts.insert(wallet.id, wallet);
        tables
    }

    #[test]
    fn test_duplicate_account_names_rejected() {
        let mut tables = tables_with_wallet();
        let dup = Account::new(AccountId::new(2), "WALLET", AccountType::Debit);
        tables.accounts.insert(dup.id, dup);

        let err = tables.check_constraints().unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { entity_type: "Account", .. }));
    }

    #[test]
    fn test_same_category_name_allowed_across_vocabularies() {
        let mut tables = Tables::default();
        for (id, kind) in [(1, CategoryKind::Expense), (2, CategoryKind::Income)] {
            let c = Category::new(CategoryId::new(id), kind, "Other");
            tables.categories.insert(c.id, c);
        }
        assert!(tables.check_constraints().is_ok());

        let c = Category::new(CategoryId::new(3), CategoryKind::Income, "other");
        tables.categories.insert(c.id, c);
        assert!(tables.check_constraints().is_err());
    }

    #[test]
    fn test_orphan_transaction_rejected() {
        let mut tables = Tables::default();
        let txn = Transaction::new(
            TransactionId::new(1),
            AccountId::new(9),
            TransactionType::Income,
            Money::from_major(1),
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        tables.transactions.insert(txn.id, txn);
        assert!(matches!(
            tables.check_constraints(),
            Err(LedgerError::Storage(_))
        ));
    }

    #[test]
    fn test_file_round_trip_splits_vocabularies() {
        let mut tables = tables_with_wallet();
        let food = Category::new(CategoryId::new(1), CategoryKind::Expense, "Food");
        let pay = Category::new(CategoryId::new(2), CategoryKind::Income, "Salary");
        tables.categories.insert(food.id, food);
        tables.categories.insert(pay.id, pay);

        let json = serde_json::to_value(tables.to_file()).unwrap();
        assert_eq!(json["expense_categories"][0]["name"], "Food");
        assert_eq!(json["income_categories"][0]["name"], "Salary");
        assert!(json["income_categories"][0].get("kind").is_none());

        let file: LedgerFile = serde_json::from_value(json).unwrap();
        let restored = Tables::from_file(file).unwrap();
        assert_eq!(
            restored.categories[&CategoryId::new(2)].kind,
            CategoryKind::Income
        );
        assert_eq!(restored.accounts.len(), 1);
    }

    #[test]
    fn test_sequences_repaired_on_load() {
        let json = serde_json::json!({
            "accounts": [{
                "id": 5,
                "name": "Card",
                "balance": 0,
                "type": "debit",
                "created_at": "2025-01-01T00:00:00Z"
            }],
            "sequences": { "accounts": 2, "transactions": 7 }
        });
        let file: LedgerFile = serde_json::from_value(json).unwrap();
        let tables = Tables::from_file(file).unwrap();
        assert_eq!(tables.sequences.accounts, 5);
        assert_eq!(tables.sequences.transactions, 7);
        assert_eq!(tables.sequences.transfers, 0);
    }

    #[test]
    fn test_category_id_shared_by_both_vocabularies_is_rejected() {
        let json = serde_json::json!({
            "expense_categories": [{ "id": 1, "name": "Food" }],
            "income_categories": [{ "id": 1, "name": "Salary" }]
        });
        let file: LedgerFile = serde_json::from_value(json).unwrap();
        assert!(matches!(
            Tables::from_file(file),
            Err(LedgerError::Storage(_))
        ));
    }
}
