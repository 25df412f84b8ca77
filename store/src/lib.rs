//! Abstract collaborator traits for the Ballot governance core.
//!
//! The governance engine depends only on these traits. Backends (a token
//! ledger, an in-memory registry for testing) implement them.

pub mod balance;
pub mod error;

pub use balance::BalanceStore;
pub use error::StoreError;
