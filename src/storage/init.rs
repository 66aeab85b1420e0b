//! Storage initialization
//!
//! Handles first-run setup: seeds the default expense and income
//! vocabularies into an empty ledger.

use tracing::info;

use crate::error::LedgerResult;
use crate::models::{Category, CategoryKind};

use super::Storage;

/// Seed any empty category vocabulary with its defaults
///
/// Vocabularies that already have entries are left alone, so running this
/// twice is harmless. Returns the number of categories created.
pub fn initialize_storage(storage: &Storage) -> LedgerResult<usize> {
    let existing = storage.all::<Category>()?;
    let mut session = storage.begin();
    let mut created = 0;

    for kind in [CategoryKind::Expense, CategoryKind::Income] {
        if existing.iter().any(|c| c.kind == kind) {
            continue;
        }
        for name in kind.default_names() {
            let id = session.next_id::<Category>()?;
            session.insert(Category::new(id, kind, *name));
            created += 1;
        }
    }

    session.commit()?;
    if created > 0 {
        info!(created, "Seeded default categories");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerPaths;
    use tempfile::TempDir;

    #[test]
    fn test_seeds_both_vocabularies_once() {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();

        let created = initialize_storage(&storage).unwrap();
        assert_eq!(
            created,
            CategoryKind::Expense.default_names().len() + CategoryKind::Income.default_names().len()
        );
        assert_eq!(initialize_storage(&storage).unwrap(), 0);

        let categories = storage.all::<Category>().unwrap();
        assert!(categories
            .iter()
            .any(|c| c.kind == CategoryKind::Income && c.name == "Salary"));
        // "Other" exists in both vocabularies
        assert_eq!(categories.iter().filter(|c| c.name == "Other").count(), 2);
    }
}
