//! Voting weight amounts.
//!
//! Amounts are non-negative integers (u128) in the units of the external
//! balance registry. Tallies use the same unit, so a tally is directly
//! comparable with the balances that funded it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A quantity of voting weight.
///
/// There is deliberately no `Add`/`Sub` impl: every arithmetic path in the
/// governance core must decide what happens on overflow.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VoteAmount(u128);

impl VoteAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl From<u128> for VoteAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for VoteAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
