use crate::domain::{Account, AccountId, Favorite, FavoriteId, Payment, PaymentId};

/// In-memory repository owning the ledger collections and the account-ID
/// counter.
///
/// Collections are append-only vectors in creation order; every lookup is a
/// linear scan that stops at the first match.
#[derive(Debug, Default)]
pub struct Repository {
    next_account_id: AccountId,
    accounts: Vec<Account>,
    payments: Vec<Payment>,
    favorites: Vec<Favorite>,
}

impl Repository {
    /// Create an empty repository. The first allocated account ID is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequential account ID.
    pub fn allocate_account_id(&mut self) -> AccountId {
        self.next_account_id += 1;
        self.next_account_id
    }

    /// Make sure future allocations never hand out `id` or anything below it.
    pub fn reserve_account_id(&mut self, id: AccountId) {
        if id > self.next_account_id {
            self.next_account_id = id;
        }
    }

    // ========================
    // Account operations
    // ========================

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn find_account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn find_account_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn find_account_by_phone(&self, phone: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.phone == phone)
    }

    /// Append an account without checking for an existing ID.
    pub fn push_account(&mut self, account: Account) {
        self.reserve_account_id(account.id);
        self.accounts.push(account);
    }

    /// Overwrite the account with the same ID in place, or append it.
    /// Returns true if an existing account was updated.
    pub fn upsert_account(&mut self, account: Account) -> bool {
        self.reserve_account_id(account.id);
        match self.find_account_mut(account.id) {
            Some(existing) => {
                existing.phone = account.phone;
                existing.balance = account.balance;
                true
            }
            None => {
                self.accounts.push(account);
                false
            }
        }
    }

    // ========================
    // Payment operations
    // ========================

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn find_payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|payment| payment.id == id)
    }

    pub fn find_payment_mut(&mut self, id: PaymentId) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|payment| payment.id == id)
    }

    pub fn push_payment(&mut self, payment: Payment) {
        self.payments.push(payment);
    }

    /// Overwrite the payment with the same ID in place, or append it.
    /// Returns true if an existing payment was updated.
    pub fn upsert_payment(&mut self, payment: Payment) -> bool {
        match self.find_payment_mut(payment.id) {
            Some(existing) => {
                existing.account_id = payment.account_id;
                existing.amount = payment.amount;
                existing.category = payment.category;
                existing.status = payment.status;
                true
            }
            None => {
                self.payments.push(payment);
                false
            }
        }
    }

    // ========================
    // Favorite operations
    // ========================

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn find_favorite(&self, id: FavoriteId) -> Option<&Favorite> {
        self.favorites.iter().find(|favorite| favorite.id == id)
    }

    pub fn push_favorite(&mut self, favorite: Favorite) {
        self.favorites.push(favorite);
    }

    /// Overwrite the favorite with the same ID in place, or append it.
    ///
    /// An empty incoming name never replaces an existing one, since the
    /// directory dump format does not carry display names.
    pub fn upsert_favorite(&mut self, favorite: Favorite) -> bool {
        match self.favorites.iter_mut().find(|f| f.id == favorite.id) {
            Some(existing) => {
                existing.account_id = favorite.account_id;
                existing.amount = favorite.amount;
                existing.category = favorite.category;
                if !favorite.name.is_empty() {
                    existing.name = favorite.name;
                }
                true
            }
            None => {
                self.favorites.push(favorite);
                false
            }
        }
    }
}
