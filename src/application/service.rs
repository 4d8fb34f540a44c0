use tracing::{info, warn};

use crate::domain::{
    sum_payments, Account, AccountId, Favorite, FavoriteId, Money, Payment, PaymentId,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, tests, embedding code).
///
/// Mutating operations take `&mut self`: the service has a single writer at a
/// time and performs no locking of its own. Callers that need to share one
/// ledger between threads wrap it in their own `Mutex`.
#[derive(Debug, Default)]
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger backed by an existing repository.
    pub fn with_repository(repo: Repository) -> Self {
        Self { repo }
    }

    pub(crate) fn repo_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }

    pub fn accounts(&self) -> &[Account] {
        self.repo.accounts()
    }

    pub fn payments(&self) -> &[Payment] {
        self.repo.payments()
    }

    pub fn favorites(&self) -> &[Favorite] {
        self.repo.favorites()
    }

    // ========================
    // Account operations
    // ========================

    /// Register a new zero-balance account for `phone`.
    pub fn register_account(&mut self, phone: &str) -> Result<Account, AppError> {
        if self.repo.find_account_by_phone(phone).is_some() {
            return Err(AppError::DuplicatePhone(phone.to_string()));
        }

        let id = self.repo.allocate_account_id();
        let account = Account::new(id, phone);
        self.repo.push_account(account.clone());

        info!(account_id = id, phone, "account registered");
        Ok(account)
    }

    /// Add `amount` to the account balance.
    pub fn deposit(&mut self, account_id: AccountId, amount: Money) -> Result<(), AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(amount));
        }

        let account = self
            .repo
            .find_account_mut(account_id)
            .ok_or(AppError::AccountNotFound(account_id))?;
        if !account.credit(amount) {
            return Err(AppError::BalanceOverflow {
                account_id,
                balance: account.balance,
                amount,
            });
        }

        info!(account_id, amount, balance = account.balance, "deposit applied");
        Ok(())
    }

    /// Get an account by ID.
    pub fn find_account(&self, account_id: AccountId) -> Result<&Account, AppError> {
        self.repo
            .find_account(account_id)
            .ok_or(AppError::AccountNotFound(account_id))
    }

    // ========================
    // Payment operations
    // ========================

    /// Debit the account and record a new in-progress payment.
    ///
    /// Every check runs before anything is mutated, so a failed payment
    /// leaves both the balance and the payment history untouched.
    pub fn pay(
        &mut self,
        account_id: AccountId,
        amount: Money,
        category: &str,
    ) -> Result<Payment, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(amount));
        }

        let account = self
            .repo
            .find_account_mut(account_id)
            .ok_or(AppError::AccountNotFound(account_id))?;

        if !account.can_cover(amount) {
            return Err(AppError::InsufficientBalance {
                account_id,
                balance: account.balance,
                required: amount,
            });
        }

        if !account.debit(amount) {
            return Err(AppError::BalanceOverflow {
                account_id,
                balance: account.balance,
                amount: -amount,
            });
        }
        let payment = Payment::new(account_id, amount, category);
        self.repo.push_payment(payment.clone());

        info!(
            account_id,
            amount,
            category,
            payment_id = %payment.id,
            "payment created"
        );
        Ok(payment)
    }

    /// Get a payment by ID.
    pub fn find_payment(&self, payment_id: PaymentId) -> Result<&Payment, AppError> {
        self.repo
            .find_payment(payment_id)
            .ok_or(AppError::PaymentNotFound(payment_id))
    }

    /// Fail a payment and credit its amount back to the owning account.
    ///
    /// Not idempotent: rejecting a payment that is already failed credits the
    /// account a second time. Callers must reject a payment at most once.
    pub fn reject(&mut self, payment_id: PaymentId) -> Result<(), AppError> {
        let payment = self.find_payment(payment_id)?;
        let (account_id, amount, already_failed) =
            (payment.account_id, payment.amount, payment.is_failed());

        let account = self
            .repo
            .find_account_mut(account_id)
            .ok_or(AppError::AccountNotFound(account_id))?;
        if !account.credit(amount) {
            return Err(AppError::BalanceOverflow {
                account_id,
                balance: account.balance,
                amount,
            });
        }

        if let Some(payment) = self.repo.find_payment_mut(payment_id) {
            payment.mark_failed();
        }

        if already_failed {
            warn!(%payment_id, account_id, amount, "payment rejected again; amount credited twice");
        } else {
            info!(%payment_id, account_id, amount, "payment rejected");
        }
        Ok(())
    }

    /// Make a fresh payment with the same account, amount and category as an
    /// earlier one. The original payment is left untouched.
    pub fn repeat(&mut self, payment_id: PaymentId) -> Result<Payment, AppError> {
        let original = self.find_payment(payment_id)?;
        let (account_id, amount, category) =
            (original.account_id, original.amount, original.category.clone());

        self.pay(account_id, amount, &category)
    }

    /// All payments owned by an account, in creation order.
    pub fn account_history(&self, account_id: AccountId) -> Result<Vec<Payment>, AppError> {
        self.find_account(account_id)?;

        Ok(self
            .repo
            .payments()
            .iter()
            .filter(|payment| payment.account_id == account_id)
            .cloned()
            .collect())
    }

    // ========================
    // Favorite operations
    // ========================

    /// Save a payment as a named template.
    pub fn favorite_payment(
        &mut self,
        payment_id: PaymentId,
        name: &str,
    ) -> Result<Favorite, AppError> {
        let payment = self.find_payment(payment_id)?;
        let favorite = Favorite::from_payment(payment, name);
        self.repo.push_favorite(favorite.clone());

        info!(favorite_id = %favorite.id, %payment_id, name, "favorite saved");
        Ok(favorite)
    }

    /// Get a favorite by ID.
    pub fn find_favorite(&self, favorite_id: FavoriteId) -> Result<&Favorite, AppError> {
        self.repo
            .find_favorite(favorite_id)
            .ok_or(AppError::FavoriteNotFound(favorite_id))
    }

    /// Make a payment from a saved template.
    pub fn pay_from_favorite(&mut self, favorite_id: FavoriteId) -> Result<Payment, AppError> {
        let favorite = self.find_favorite(favorite_id)?;
        let (account_id, amount, category) =
            (favorite.account_id, favorite.amount, favorite.category.clone());

        self.pay(account_id, amount, &category)
    }

    // ========================
    // Aggregation
    // ========================

    /// Total amount across all payments, summed by `workers` concurrent
    /// workers over disjoint partitions (single pass when `workers` is 0).
    pub fn sum_payments(&self, workers: usize) -> Result<Money, AppError> {
        sum_payments(self.repo.payments(), workers).ok_or(AppError::TotalOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded_service() -> (LedgerService, AccountId) {
        let mut service = LedgerService::new();
        let account = service.register_account("+992000000000").unwrap();
        service.deposit(account.id, 10_000).unwrap();
        (service, account.id)
    }

    #[test]
    fn test_failed_pay_has_no_partial_effect() {
        let (mut service, id) = funded_service();

        let err = service.pay(id, 10_001, "auto").unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { required: 10_001, .. }));
        assert_eq!(service.find_account(id).unwrap().balance, 10_000);
        assert!(service.payments().is_empty());

        assert_eq!(service.pay(id, 0, "auto"), Err(AppError::InvalidAmount(0)));
        assert_eq!(service.pay(99, 1, "auto"), Err(AppError::AccountNotFound(99)));
        assert!(service.payments().is_empty());
    }

    #[test]
    fn test_pay_exact_balance() {
        let (mut service, id) = funded_service();
        service.pay(id, 10_000, "rent").unwrap();
        assert_eq!(service.find_account(id).unwrap().balance, 0);
    }

    #[test]
    fn test_reject_twice_credits_twice() {
        let (mut service, id) = funded_service();
        let payment = service.pay(id, 100, "auto").unwrap();

        service.reject(payment.id).unwrap();
        service.reject(payment.id).unwrap();

        assert_eq!(service.find_account(id).unwrap().balance, 10_100);
    }

    #[test]
    fn test_reject_overflow_keeps_payment_in_progress() {
        let mut repo = Repository::new();
        repo.push_account(Account::new(1, "+992000000000").with_balance(Money::MAX));
        let payment = Payment::new(1, 1, "auto");
        repo.push_payment(payment.clone());
        let mut service = LedgerService::with_repository(repo);

        assert!(matches!(
            service.reject(payment.id),
            Err(AppError::BalanceOverflow { account_id: 1, .. })
        ));
        assert_eq!(service.find_account(1).unwrap().balance, Money::MAX);
        assert!(!service.find_payment(payment.id).unwrap().is_failed());
    }

    #[test]
    fn test_reject_with_vanished_account() {
        let mut repo = Repository::new();
        let payment = Payment::new(42, 100, "auto");
        repo.push_payment(payment.clone());
        let mut service = LedgerService::with_repository(repo);

        assert_eq!(service.reject(payment.id), Err(AppError::AccountNotFound(42)));
        assert!(!service.find_payment(payment.id).unwrap().is_failed());
    }

    #[test]
    fn test_account_history_filters_by_owner() {
        let (mut service, id) = funded_service();
        let other = service.register_account("+992000000001").unwrap();
        service.deposit(other.id, 500).unwrap();

        service.pay(id, 100, "auto").unwrap();
        service.pay(other.id, 200, "food").unwrap();
        service.pay(id, 300, "mobile").unwrap();

        let history = service.account_history(id).unwrap();
        let amounts: Vec<Money> = history.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![100, 300]);

        assert_eq!(
            service.account_history(7).unwrap_err(),
            AppError::AccountNotFound(7)
        );
    }
}
