//! Governance proposals and the table that owns them.

use crate::error::GovernanceError;
use ballot_types::{AccountId, ProposalId, Timestamp, VoteAmount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a proposal.
///
/// `Active` is the only non-terminal status. A proposal leaves it exactly
/// once, through finalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    Active,
    Passed,
    Rejected,
}

impl ProposalStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

/// Result of finalizing a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalOutcome {
    Passed,
    Rejected,
}

impl ProposalOutcome {
    /// Strict majority of committed weight passes; a tie keeps the status quo.
    pub fn decide(yes_votes: VoteAmount, no_votes: VoteAmount) -> Self {
        if yes_votes > no_votes {
            Self::Passed
        } else {
            Self::Rejected
        }
    }
}

impl From<ProposalOutcome> for ProposalStatus {
    fn from(outcome: ProposalOutcome) -> Self {
        match outcome {
            ProposalOutcome::Passed => Self::Passed,
            ProposalOutcome::Rejected => Self::Rejected,
        }
    }
}

impl fmt::Display for ProposalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// Side a vote is cast for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
}

impl FromStr for VoteChoice {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("yes") {
            Ok(Self::Yes)
        } else if s.eq_ignore_ascii_case("no") {
            Ok(Self::No)
        } else {
            Err(GovernanceError::InvalidChoice(s.to_string()))
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => f.write_str("yes"),
            Self::No => f.write_str("no"),
        }
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: AccountId,
    pub title: String,
    pub description: String,
    /// When the proposal was created; voting opens immediately.
    pub start_time: Timestamp,
    /// Last instant at which votes are accepted and first instant at which
    /// the proposal can be finalized.
    pub end_time: Timestamp,
    pub yes_votes: VoteAmount,
    pub no_votes: VoteAmount,
    pub status: ProposalStatus,
}

impl Proposal {
    /// Running tally for one side.
    pub fn tally(&self, choice: VoteChoice) -> VoteAmount {
        match choice {
            VoteChoice::Yes => self.yes_votes,
            VoteChoice::No => self.no_votes,
        }
    }

    /// Sum of both tallies, or `None` if it does not fit in a `VoteAmount`.
    pub fn total_votes(&self) -> Option<VoteAmount> {
        self.yes_votes.checked_add(self.no_votes)
    }

    /// Whether a vote cast at `now` falls inside the window.
    pub fn accepts_votes_at(&self, now: Timestamp) -> bool {
        self.status.is_active() && now <= self.end_time
    }

    /// Whether the window has closed so the proposal may be finalized.
    pub fn window_closed_at(&self, now: Timestamp) -> bool {
        now >= self.end_time
    }

    fn tally_mut(&mut self, choice: VoteChoice) -> &mut VoteAmount {
        match choice {
            VoteChoice::Yes => &mut self.yes_votes,
            VoteChoice::No => &mut self.no_votes,
        }
    }
}

/// Owns every proposal and hands out sequential ids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: ProposalId,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            proposals: BTreeMap::new(),
            next_id: ProposalId::FIRST,
        }
    }

    /// Insert a new active proposal whose window is `[now, now + voting_period]`.
    pub fn create(
        &mut self,
        title: String,
        description: String,
        proposer: AccountId,
        now: Timestamp,
        voting_period: u64,
    ) -> Result<ProposalId, GovernanceError> {
        let id = self.next_id;
        let following = id.next().ok_or(GovernanceError::Overflow("proposal id"))?;
        let end_time = now
            .checked_add(voting_period)
            .ok_or(GovernanceError::Overflow("voting window end"))?;

        self.proposals.insert(
            id,
            Proposal {
                id,
                proposer,
                title,
                description,
                start_time: now,
                end_time,
                yes_votes: VoteAmount::ZERO,
                no_votes: VoteAmount::ZERO,
                status: ProposalStatus::Active,
            },
        );
        self.next_id = following;
        Ok(id)
    }

    pub fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// Add `amount` to the tally for `choice`.
    ///
    /// The caller has already validated the vote; this only guards the
    /// arithmetic, and leaves the proposal untouched on overflow.
    pub fn apply_vote(
        &mut self,
        id: ProposalId,
        choice: VoteChoice,
        amount: VoteAmount,
    ) -> Result<VoteAmount, GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        let tally = proposal.tally_mut(choice);
        *tally = tally
            .checked_add(amount)
            .ok_or(GovernanceError::Overflow("vote tally"))?;
        Ok(*tally)
    }

    /// Close an active proposal and record its outcome.
    ///
    /// Not idempotent: a proposal that is already terminal is rejected.
    pub fn finalize(&mut self, id: ProposalId) -> Result<ProposalOutcome, GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if proposal.status.is_terminal() {
            return Err(GovernanceError::ProposalNotActive {
                proposal: id,
                status: proposal.status,
            });
        }
        let outcome = ProposalOutcome::decide(proposal.yes_votes, proposal.no_votes);
        proposal.status = outcome.into();
        Ok(outcome)
    }

    /// Put a tally back to a value captured before a failed vote commit.
    pub(crate) fn restore_tally(&mut self, id: ProposalId, choice: VoteChoice, value: VoteAmount) {
        if let Some(proposal) = self.proposals.get_mut(&id) {
            *proposal.tally_mut(choice) = value;
        }
    }

    /// Administrative hook for simulating elapsed time in tests.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn override_end_time(
        &mut self,
        id: ProposalId,
        end_time: Timestamp,
    ) -> Result<(), GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        proposal.end_time = end_time;
        Ok(())
    }

    /// All proposals in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&ProposalId, &Proposal)> {
        self.proposals.iter()
    }

    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, key: ProposalId, proposal: Proposal) {
        self.proposals.insert(key, proposal);
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// The id the next `create` will hand out.
    pub fn next_id(&self) -> ProposalId {
        self.next_id
    }
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}
