//! Fundamental types for the Ballot governance core.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identities, voting amounts, proposal ids, timestamps, the clock
//! abstraction, and the governance parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod id;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use amount::VoteAmount;
pub use error::BallotError;
pub use id::ProposalId;
pub use params::{GovernanceParams, VotePolicy};
pub use time::{Clock, SystemClock, Timestamp};
