//! Audit logging for Pocketbook
//!
//! Every committed session appends one JSON line per changed row to
//! `audit.log`, with before/after values and a short diff for updates.
//!
//! - `AuditEntry`: a single logged operation on one row
//! - `AuditLogger`: appends entries and reads them back (JSONL)
//! - `generate_diff`: top-level field changes between two row states
//!
//! Entries are collected by the storage session while it stages writes and
//! flushed only after the ledger document has been persisted.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
