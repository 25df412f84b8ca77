use ballot_types::VoteAmount;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance {
        needed: VoteAmount,
        available: VoteAmount,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}
