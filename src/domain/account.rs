use serde::{Deserialize, Serialize};

use super::Money;

pub type AccountId = i64;

/// A wallet account identified by a sequential numeric ID and a unique phone.
///
/// Field order is the on-disk column order: `ID;Phone;Balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub phone: String,
    pub balance: Money,
}

impl Account {
    /// Create a new account with a zero balance.
    pub fn new(id: AccountId, phone: impl Into<String>) -> Self {
        Self {
            id,
            phone: phone.into(),
            balance: 0,
        }
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    /// Returns true if the balance covers `amount`.
    pub fn can_cover(&self, amount: Money) -> bool {
        self.balance >= amount
    }

    /// Add `amount` to the balance. Returns false and leaves the balance
    /// untouched when the result would overflow.
    pub fn credit(&mut self, amount: Money) -> bool {
        match self.balance.checked_add(amount) {
            Some(balance) => {
                self.balance = balance;
                true
            }
            None => false,
        }
    }

    /// Subtract `amount` from the balance, with the same overflow rule as `credit`.
    pub fn debit(&mut self, amount: Money) -> bool {
        match self.balance.checked_sub(amount) {
            Some(balance) => {
                self.balance = balance;
                true
            }
            None => false,
        }
    }
}
