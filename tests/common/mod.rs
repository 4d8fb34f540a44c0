// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use tempfile::TempDir;
use wallet_ledger::application::LedgerService;
use wallet_ledger::domain::{Account, Money, Payment};

/// Helper to create an empty service together with a scratch directory
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    Ok((LedgerService::new(), temp_dir))
}

/// Test fixture: an account with a starting balance and a few payments
pub struct TestAccount {
    pub phone: &'static str,
    pub balance: Money,
    pub payments: Vec<(Money, &'static str)>,
}

impl Default for TestAccount {
    /// The standard account: 10000 on +992000000000 and one 100 "auto" payment
    fn default() -> Self {
        Self {
            phone: "+992000000000",
            balance: 10_000,
            payments: vec![(100, "auto")],
        }
    }
}

impl TestAccount {
    /// Register, fund, and make the fixture's payments
    pub fn create(&self, service: &mut LedgerService) -> Result<(Account, Vec<Payment>)> {
        let account = service.register_account(self.phone)?;
        service.deposit(account.id, self.balance)?;

        let mut payments = Vec::with_capacity(self.payments.len());
        for (amount, category) in &self.payments {
            payments.push(service.pay(account.id, *amount, category)?);
        }

        let account = service.find_account(account.id)?.clone();
        Ok((account, payments))
    }
}

/// Fill a single account with `count` payments of 1..=count
pub fn service_with_payments(count: usize) -> Result<LedgerService> {
    let mut service = LedgerService::new();
    let account = service.register_account("+992000000099")?;
    let count = count as Money;
    service.deposit(account.id, count * (count + 1) / 2 + 1)?;
    for amount in 1..=count {
        service.pay(account.id, amount, "bulk")?;
    }
    Ok(service)
}
