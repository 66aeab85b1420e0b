//! Strongly-typed ID wrappers for all entity types
//!
//! Every table has its own stable integer identifier space. Using newtype
//! wrappers prevents mixing up IDs from different entity types at compile
//! time; ordering is meaningful and is used for lock acquisition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row identifier
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw row identifier
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Parse an ID from a string, with or without its display prefix
            pub fn parse(s: &str) -> Result<Self, ParseIntError> {
                s.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(AccountId, "acc-");
define_id!(TransactionId, "txn-");
define_id!(TransferId, "trf-");
define_id!(RecurringPaymentId, "rec-");
define_id!(PlannedPaymentId, "pln-");
define_id!(CategoryId, "cat-");
