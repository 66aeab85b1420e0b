//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::generate_diff;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Ledger tables whose rows are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Account,
    Transaction,
    Transfer,
    RecurringPayment,
    PlannedPayment,
    Category,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Account => write!(f, "Account"),
            EntityType::Transaction => write!(f, "Transaction"),
            EntityType::Transfer => write!(f, "Transfer"),
            EntityType::RecurringPayment => write!(f, "RecurringPayment"),
            EntityType::PlannedPayment => write!(f, "PlannedPayment"),
            EntityType::Category => write!(f, "Category"),
        }
    }
}

/// A single audit log entry
///
/// Records one operation on one row, with the row's JSON before and/or after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Type of operation performed
    pub operation: Operation,

    /// Type of entity affected
    pub entity_type: EntityType,

    /// ID of the affected entity
    pub entity_id: String,

    /// Human-readable description of the entity (e.g., account name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// JSON representation of the entity before the operation (for updates/deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// JSON representation of the entity after the operation (for creates/updates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Human-readable diff summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn new(
        operation: Operation,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary: None,
        }
    }

    /// Entry for a newly inserted row
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let after = serde_json::to_value(entity).ok();
        Self::new(
            Operation::Create,
            entity_type,
            entity_id.into(),
            entity_name,
            None,
            after,
        )
    }

    /// Entry for a replaced row; the summary lists the changed columns
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        let diff_summary = match (&before, &after) {
            (Some(b), Some(a)) => generate_diff(b, a),
            _ => None,
        };
        Self {
            diff_summary,
            ..Self::new(
                Operation::Update,
                entity_type,
                entity_id.into(),
                entity_name,
                before,
                after,
            )
        }
    }

    /// Entry for a removed row
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let before = serde_json::to_value(entity).ok();
        Self::new(
            Operation::Delete,
            entity_type,
            entity_id.into(),
            entity_name,
            before,
            None,
        )
    }

    /// Attach or replace the human-readable summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.diff_summary = Some(summary.into());
        self
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Update.to_string(), "UPDATE");
        assert_eq!(Operation::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_entity_type_display() {
        assert_eq!(EntityType::Account.to_string(), "Account");
        assert_eq!(EntityType::Transfer.to_string(), "Transfer");
        assert_eq!(EntityType::PlannedPayment.to_string(), "PlannedPayment");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"name": "Wallet", "balance": 100000});
        let entry = AuditEntry::create(
            EntityType::Account,
            "acc-1",
            Some("Wallet".to_string()),
            &data,
        );

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Account);
        assert_eq!(entry.entity_id, "acc-1");
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_entry() {
        let before = json!({"amount": -30000, "description": "Cafe"});
        let after = json!({"amount": -50000, "description": "Cafe"});

        let entry = AuditEntry::update(
            EntityType::Transaction,
            "txn-2",
            Some("Cafe".to_string()),
            &before,
            &after,
        );

        assert_eq!(entry.operation, Operation::Update);
        assert!(entry.before.is_some());
        assert!(entry.after.is_some());
        assert_eq!(
            entry.diff_summary,
            Some("amount: -30000 -> -50000".to_string())
        );
    }

    #[test]
    fn test_delete_entry() {
        let data = json!({"name": "Old Card"});
        let entry = AuditEntry::delete(
            EntityType::Account,
            "acc-3",
            Some("Old Card".to_string()),
            &data,
        )
        .with_summary("still referenced by 1 transfer(s)");

        assert_eq!(entry.operation, Operation::Delete);
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("still referenced by 1 transfer(s)")
        );
    }

    #[test]
    fn test_serialization() {
        let data = json!({"payment_day": 5});
        let entry = AuditEntry::create(EntityType::RecurringPayment, "rec-1", None, &data);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"entity_type\":\"recurring_payment\""));
        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.operation, Operation::Create);
        assert_eq!(deserialized.entity_type, EntityType::RecurringPayment);
    }

    #[test]
    fn test_human_readable_format() {
        let data = json!({"description": "Concert"});
        let entry = AuditEntry::create(
            EntityType::PlannedPayment,
            "pln-4",
            Some("Concert".to_string()),
            &data,
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("CREATE"));
        assert!(formatted.contains("PlannedPayment"));
        assert!(formatted.contains("pln-4"));
        assert!(formatted.contains("Concert"));
    }
}
