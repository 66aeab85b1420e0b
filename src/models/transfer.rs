//! Transfer model
//!
//! A transfer moves money between two of the user's own accounts. It is a
//! pair of balance deltas plus this one record; it creates no transactions
//! and is never edited after the fact.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, TransferId};
use super::money::Money;

/// An immutable record of money moved between two accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    /// Always positive
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    pub transfer_date: NaiveDateTime,
}

impl Transfer {
    /// Check whether the given account is either side of this transfer
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.from_account_id == account_id || self.to_account_id == account_id
    }

    /// Net effect of this transfer on the given account's balance
    pub fn effect_on(&self, account_id: AccountId) -> Money {
        let mut effect = Money::zero();
        if self.to_account_id == account_id {
            effect += self.amount;
        }
        if self.from_account_id == account_id {
            effect -= self.amount;
        }
        effect
    }
}
