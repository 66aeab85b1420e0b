//! Category display formatting

use crate::models::{Category, CategoryKind};

/// Format one vocabulary as a list
pub fn format_category_list(kind: CategoryKind, categories: &[Category]) -> String {
    let title = match kind {
        CategoryKind::Expense => "Expense categories",
        CategoryKind::Income => "Income categories",
    };

    if categories.is_empty() {
        return format!("{}: none\n", title);
    }

    let mut output = format!("{}:\n", title);
    for category in categories {
        output.push_str(&format!("  {:<8} {}\n", category.id.to_string(), category.name));
    }
    output
}
