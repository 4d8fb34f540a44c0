use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Money};

pub type PaymentId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "INPROGRESS")]
    InProgress,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Ok => "OK",
            PaymentStatus::Fail => "FAIL",
            PaymentStatus::InProgress => "INPROGRESS",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(PaymentStatus::Ok),
            "FAIL" => Some(PaymentStatus::Fail),
            "INPROGRESS" => Some(PaymentStatus::InProgress),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A debit from an account. The amount is fixed at creation; only the
/// status ever changes.
///
/// Field order is the on-disk column order: `ID;AccountID;Amount;Category;Status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub account_id: AccountId,
    pub amount: Money,
    pub category: String,
    pub status: PaymentStatus,
}

impl Payment {
    /// Create a new in-progress payment with a fresh ID.
    pub fn new(account_id: AccountId, amount: Money, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            amount,
            category: category.into(),
            status: PaymentStatus::InProgress,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == PaymentStatus::Fail
    }

    pub fn mark_failed(&mut self) {
        self.status = PaymentStatus::Fail;
    }
}
