//! Nullable balance registry: thread-safe in-memory balances for testing.

use ballot_store::{BalanceStore, StoreError};
use ballot_types::{AccountId, VoteAmount};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// An in-memory balance registry.
///
/// Balances are seeded with [`NullBalanceStore::set_balance`]; the engine can
/// only debit them.
pub struct NullBalanceStore {
    balances: Mutex<HashMap<AccountId, VoteAmount>>,
}

impl NullBalanceStore {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// Build a registry pre-seeded with the given balances.
    pub fn with_balances<I, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, u128)>,
        A: Into<AccountId>,
    {
        let store = Self::new();
        for (account, raw) in entries {
            store.set_balance(&account.into(), VoteAmount::new(raw));
        }
        store
    }

    /// Overwrite an account's balance.
    pub fn set_balance(&self, account: &AccountId, amount: VoteAmount) {
        self.lock().insert(account.clone(), amount);
    }

    /// Balance of `account`, zero if unknown.
    pub fn get(&self, account: &AccountId) -> VoteAmount {
        self.lock().get(account).copied().unwrap_or(VoteAmount::ZERO)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AccountId, VoteAmount>> {
        // A poisoned map still holds consistent balances: every write is a single insert.
        self.balances.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for NullBalanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceStore for NullBalanceStore {
    fn balance_of(&self, account: &AccountId) -> Result<VoteAmount, StoreError> {
        Ok(self.get(account))
    }

    fn debit(&self, account: &AccountId, amount: VoteAmount) -> Result<VoteAmount, StoreError> {
        let mut balances = self.lock();
        let available = balances.get(account).copied().unwrap_or(VoteAmount::ZERO);
        let remaining = available
            .checked_sub(amount)
            .ok_or(StoreError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        balances.insert(account.clone(), remaining);
        Ok(remaining)
    }
}
