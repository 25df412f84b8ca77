//! Nullable infrastructure for deterministic testing.
//!
//! The governance engine reaches the outside world only through the `Clock`
//! and `BalanceStore` traits. This crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem, the network, or the system clock
//!
//! Usage: swap real collaborators for nullables in tests.

pub mod balance;
pub mod clock;

pub use balance::NullBalanceStore;
pub use clock::NullClock;
