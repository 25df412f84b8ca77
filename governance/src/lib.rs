//! Token-weighted governance.
//!
//! Lifecycle: a proposal is created `Active` with a fixed voting window;
//! token holders commit balance to Yes or No while the window is open; once
//! it closes the proposal is finalized exactly once, to `Passed` on a strict
//! Yes majority and to `Rejected` otherwise (ties keep the status quo).
//!
//! Committed weight is spent: it is debited from the external balance
//! registry and never returned, whatever the outcome.

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod proposal;
pub mod state;

pub use config::{ConfigError, GovernanceConfig};
pub use engine::GovernanceEngine;
pub use error::{ErrorKind, GovernanceError};
pub use ledger::{VoteLedger, VoteRecord};
pub use proposal::{Proposal, ProposalOutcome, ProposalStatus, ProposalStore, VoteChoice};
pub use state::GovernanceState;
