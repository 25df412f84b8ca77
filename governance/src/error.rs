use crate::proposal::{ProposalStatus, VoteChoice};
use ballot_store::StoreError;
use ballot_types::{AccountId, BallotError, ProposalId, Timestamp, VoteAmount};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("voting on proposal {proposal} ended at {end_time} (now {now})")]
    VotingPeriodEnded {
        proposal: ProposalId,
        end_time: Timestamp,
        now: Timestamp,
    },

    #[error("voting on proposal {proposal} runs until {end_time} (now {now})")]
    VotingPeriodNotEnded {
        proposal: ProposalId,
        end_time: Timestamp,
        now: Timestamp,
    },

    #[error("proposal {proposal} is not active (status {status:?})")]
    ProposalNotActive {
        proposal: ProposalId,
        status: ProposalStatus,
    },

    #[error("invalid vote choice {0:?}: expected \"yes\" or \"no\"")]
    InvalidChoice(String),

    #[error("vote amount must be non-zero")]
    ZeroAmount,

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("{field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{voter} already voted {recorded} on proposal {proposal}; a top-up cannot switch sides")]
    ChoiceMismatch {
        proposal: ProposalId,
        voter: AccountId,
        recorded: VoteChoice,
    },

    #[error("{voter} has already voted on proposal {proposal}")]
    AlreadyVoted {
        proposal: ProposalId,
        voter: AccountId,
    },

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance {
        needed: VoteAmount,
        available: VoteAmount,
    },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("balance registry error: {0}")]
    Store(StoreError),

    #[error("invalid governance state snapshot: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Params(#[from] BallotError),
}

/// Coarse classification of [`GovernanceError`] for callers that decide
/// between retrying, aborting the enclosing transaction, or reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The referenced proposal does not exist.
    NotFound,
    /// The proposal is outside the state or time window the operation needs.
    InvalidState,
    /// Malformed choice, zero amount, bad text, bad snapshot or parameters.
    InvalidInput,
    InsufficientBalance,
    AlreadyVoted,
    Overflow,
    /// The balance registry failed for a reason other than an overdraw.
    Store,
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProposalNotFound(_) => ErrorKind::NotFound,
            Self::VotingPeriodEnded { .. }
            | Self::VotingPeriodNotEnded { .. }
            | Self::ProposalNotActive { .. } => ErrorKind::InvalidState,
            Self::InvalidChoice(_)
            | Self::ZeroAmount
            | Self::EmptyField(_)
            | Self::FieldTooLong { .. }
            | Self::ChoiceMismatch { .. }
            | Self::Snapshot(_) => ErrorKind::InvalidInput,
            Self::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::Overflow(_) => ErrorKind::Overflow,
            Self::Store(_) => ErrorKind::Store,
            Self::Params(_) => ErrorKind::InvalidInput,
        }
    }
}

impl From<StoreError> for GovernanceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InsufficientBalance { needed, available } => {
                Self::InsufficientBalance { needed, available }
            }
            other => Self::Store(other),
        }
    }
}
