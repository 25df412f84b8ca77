//! Balance registry trait.

use crate::StoreError;
use ballot_types::{AccountId, VoteAmount};

/// Read/debit access to the spendable voting weight of each account.
///
/// The registry is owned by another subsystem (token issuance is out of
/// scope here). Accounts the registry has never seen hold a zero balance.
pub trait BalanceStore {
    /// Current spendable balance of `account`.
    fn balance_of(&self, account: &AccountId) -> Result<VoteAmount, StoreError>;

    /// Remove `amount` from `account` and return the remaining balance.
    ///
    /// Must fail with [`StoreError::InsufficientBalance`] exactly when
    /// `balance_of(account) < amount`, leaving the balance untouched.
    fn debit(&self, account: &AccountId, amount: VoteAmount) -> Result<VoteAmount, StoreError>;
}

impl<B: BalanceStore + ?Sized> BalanceStore for &B {
    fn balance_of(&self, account: &AccountId) -> Result<VoteAmount, StoreError> {
        (**self).balance_of(account)
    }

    fn debit(&self, account: &AccountId, amount: VoteAmount) -> Result<VoteAmount, StoreError> {
        (**self).debit(account, amount)
    }
}
