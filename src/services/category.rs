//! Category service
//!
//! Manages the expense and income vocabularies. Names are unique per
//! vocabulary, case-insensitively. Transactions keep the category name they
//! were recorded with, so renames and deletes never touch history.

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryId, CategoryKind};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Categories of one vocabulary, sorted by name
    pub fn list(&self, kind: CategoryKind) -> LedgerResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.storage.read(|tables| {
            tables
                .categories
                .values()
                .filter(|c| c.kind == kind)
                .cloned()
                .collect()
        })?;
        categories.sort_by_key(|c| c.name_key());
        Ok(categories)
    }

    /// Category names of one vocabulary, for suggestions at entry time
    pub fn names(&self, kind: CategoryKind) -> LedgerResult<Vec<String>> {
        Ok(self.list(kind)?.into_iter().map(|c| c.name).collect())
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        self.storage.get(id)
    }

    /// Get a category by name within a vocabulary (case-insensitive)
    pub fn get_by_name(&self, kind: CategoryKind, name: &str) -> LedgerResult<Option<Category>> {
        let key = name.trim().to_lowercase();
        self.storage.read(|tables| {
            tables
                .categories
                .values()
                .find(|c| c.kind == kind && c.name_key() == key)
                .cloned()
        })
    }

    /// Find a category by name or ID string
    pub fn find(&self, kind: CategoryKind, identifier: &str) -> LedgerResult<Option<Category>> {
        if let Some(category) = self.get_by_name(kind, identifier)? {
            return Ok(Some(category));
        }

        match identifier.parse::<CategoryId>() {
            Ok(id) => Ok(self.get(id)?.filter(|c| c.kind == kind)),
            Err(_) => Ok(None),
        }
    }

    /// Add a category to a vocabulary
    pub fn add(&self, kind: CategoryKind, name: &str) -> LedgerResult<Category> {
        if self.get_by_name(kind, name)?.is_some() {
            return Err(LedgerError::Duplicate {
                entity_type: "Category",
                identifier: name.trim().to_string(),
            });
        }

        let mut session = self.storage.begin();
        let category = Category::new(session.next_id::<Category>()?, kind, name);
        category.validate()?;

        session.insert(category.clone());
        session.commit()?;

        info!(id = %category.id, kind = %kind, name = %category.name, "Added category");
        Ok(category)
    }

    /// Rename a category; past transactions keep the old name
    pub fn rename(&self, id: CategoryId, name: &str) -> LedgerResult<Category> {
        let mut session = self.storage.begin();
        let before: Category = session.require(id)?;

        let mut after = before.clone();
        after.name = name.trim().to_string();
        after.validate()?;

        if after == before {
            return Ok(before);
        }

        // Uniqueness (including case changes of other names) is enforced on commit
        session.update(&before, after.clone());
        session.commit()?;

        info!(id = %id, from = %before.name, to = %after.name, "Renamed category");
        Ok(after)
    }

    /// Remove a category from its vocabulary
    pub fn delete(&self, id: CategoryId) -> LedgerResult<Category> {
        let mut session = self.storage.begin();
        let category: Category = session.require(id)?;

        session.delete(&category);
        session.commit()?;

        info!(id = %id, name = %category.name, "Deleted category");
        Ok(category)
    }
}
