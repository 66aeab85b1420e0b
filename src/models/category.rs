//! Category vocabularies
//!
//! Two independent vocabularies (expense and income) of category names.
//! Transactions store the category name itself, so a category is only a
//! suggestion at entry time; renaming or deleting one never touches history.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::transaction::TransactionType;
use crate::error::LedgerError;

/// Which vocabulary a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl CategoryKind {
    /// Parse a category kind from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }

    /// Names seeded into a fresh ledger
    pub fn default_names(&self) -> &'static [&'static str] {
        match self {
            Self::Expense => &[
                "Groceries",
                "Cafes & Restaurants",
                "Transport",
                "Housing",
                "Utilities",
                "Phone & Internet",
                "Clothing",
                "Entertainment",
                "Health",
                "Education",
                "Subscriptions",
                "Loans",
                "Rent",
                "Insurance",
                "Other",
            ],
            Self::Income => &["Salary", "Side Job", "Gift", "Investments", "Other"],
        }
    }
}

impl From<TransactionType> for CategoryKind {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => f.pad("expense"),
            Self::Income => f.pad("income"),
        }
    }
}

/// A named category within one vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub kind: CategoryKind,
    pub name: String,
}

impl Category {
    pub fn new(id: CategoryId, kind: CategoryKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into().trim().to_string(),
        }
    }

    /// Key used for the case-insensitive name uniqueness check
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        let chars = self.name.chars().count();
        if chars > 50 {
            return Err(CategoryValidationError::NameTooLong(chars));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}

impl From<CategoryValidationError> for LedgerError {
    fn from(err: CategoryValidationError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}
