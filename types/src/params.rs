//! Governance parameters consumed by the engine.

use crate::error::BallotError;
use serde::{Deserialize, Serialize};

/// How repeated votes from the same account on the same proposal are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotePolicy {
    /// At most one vote per (proposal, voter). A second attempt is rejected.
    #[default]
    SingleVote,
    /// Repeated votes add weight to the existing record. The choice may not change.
    TopUp,
}

/// Tunable values for the proposal lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Length of the voting window, in the same units the clock reports.
    pub voting_period: u64,

    /// Maximum title length in bytes.
    pub max_title_len: usize,

    /// Maximum description length in bytes.
    pub max_description_len: usize,

    /// Repeated-vote policy.
    pub vote_policy: VotePolicy,
}

impl GovernanceParams {
    /// 1440 units: ten days of ten-minute blocks when the clock counts blocks.
    pub const DEFAULT_VOTING_PERIOD: u64 = 1440;
    pub const DEFAULT_MAX_TITLE_LEN: usize = 256;
    pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 8192;

    /// Reject parameter sets the engine cannot operate with.
    pub fn validate(&self) -> Result<(), BallotError> {
        if self.voting_period == 0 {
            return Err(BallotError::InvalidParam {
                name: "voting_period",
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_title_len == 0 {
            return Err(BallotError::InvalidParam {
                name: "max_title_len",
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_description_len == 0 {
            return Err(BallotError::InvalidParam {
                name: "max_description_len",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            voting_period: Self::DEFAULT_VOTING_PERIOD,
            max_title_len: Self::DEFAULT_MAX_TITLE_LEN,
            max_description_len: Self::DEFAULT_MAX_DESCRIPTION_LEN,
            vote_policy: VotePolicy::SingleVote,
        }
    }
}
