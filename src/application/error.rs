use thiserror::Error;

use crate::domain::{AccountId, FavoriteId, Money, PaymentId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Phone already registered: {0}")]
    DuplicatePhone(String),

    #[error("Amount must be greater than 0, got {0}")]
    InvalidAmount(Money),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    #[error("Favorite not found: {0}")]
    FavoriteNotFound(FavoriteId),

    #[error("Not enough balance on account {account_id}: balance {balance}, required {required}")]
    InsufficientBalance {
        account_id: AccountId,
        balance: Money,
        required: Money,
    },

    #[error("Balance of account {account_id} would overflow: balance {balance}, credit {amount}")]
    BalanceOverflow {
        account_id: AccountId,
        balance: Money,
        amount: Money,
    },

    #[error("Payment total exceeds the representable amount")]
    TotalOverflow,
}
