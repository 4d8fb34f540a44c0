use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Money, Payment};

pub type FavoriteId = Uuid;

/// A saved payment template. Holds a snapshot of the source payment's
/// account, amount and category, not a reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub account_id: AccountId,
    pub name: String,
    pub amount: Money,
    pub category: String,
}

impl Favorite {
    pub fn from_payment(payment: &Payment, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: payment.account_id,
            name: name.into(),
            amount: payment.amount,
            category: payment.category.clone(),
        }
    }
}
