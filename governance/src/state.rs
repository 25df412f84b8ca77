//! The governance state owned by one engine instance.

use crate::error::GovernanceError;
use crate::ledger::VoteLedger;
use crate::proposal::ProposalStore;
use ballot_types::ProposalId;
use serde::{Deserialize, Serialize};

/// Proposal table plus vote table.
///
/// Every engine owns its own state, so independent instances never share
/// counters or records.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GovernanceState {
    pub(crate) proposals: ProposalStore,
    pub(crate) votes: VoteLedger,
}

impl GovernanceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn votes(&self) -> &VoteLedger {
        &self.votes
    }

    /// Mutable access to the proposal table for the administrative
    /// end-time override.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn proposals_mut(&mut self) -> &mut ProposalStore {
        &mut self.proposals
    }

    /// Serialize both tables (bincode).
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Restore state written by [`GovernanceState::save_state`].
    ///
    /// The snapshot is checked before it is accepted: every proposal must be
    /// stored under its own id, ids must be positive and below the next id to
    /// be handed out, every tally must equal the weight recorded in the vote
    /// table, and every vote must be keyed by its own proposal and voter.
    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        let state: Self =
            bincode::deserialize(data).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        state.verify()?;
        Ok(state)
    }

    fn verify(&self) -> Result<(), GovernanceError> {
        let next_id = self.proposals.next_id();
        for (key, proposal) in self.proposals.entries() {
            if *key != proposal.id {
                return Err(GovernanceError::Snapshot(format!(
                    "proposal {} is stored under key {}",
                    proposal.id, key
                )));
            }
            if proposal.id < ProposalId::FIRST || proposal.id >= next_id {
                return Err(GovernanceError::Snapshot(format!(
                    "proposal id {} is outside {}..{}",
                    proposal.id,
                    ProposalId::FIRST,
                    next_id
                )));
            }
            let (yes, no) = self.votes.committed(proposal.id)?;
            if yes != proposal.yes_votes || no != proposal.no_votes {
                return Err(GovernanceError::Snapshot(format!(
                    "tally of proposal {} does not match its vote records",
                    proposal.id
                )));
            }
        }
        for ((proposal, voter), record) in self.votes.entries() {
            if *proposal != record.proposal || *voter != record.voter {
                return Err(GovernanceError::Snapshot(format!(
                    "vote by {} on {} is stored under ({}, {})",
                    record.voter, record.proposal, proposal, voter
                )));
            }
            if self.proposals.get(*proposal).is_err() {
                return Err(GovernanceError::Snapshot(format!(
                    "vote by {} references unknown proposal {}",
                    voter, proposal
                )));
            }
        }
        Ok(())
    }
}
