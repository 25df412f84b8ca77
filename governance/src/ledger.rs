//! Vote ledger: one record per (proposal, voter).

use crate::error::GovernanceError;
use crate::proposal::VoteChoice;
use ballot_types::{AccountId, ProposalId, Timestamp, VotePolicy, VoteAmount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The weight an account committed to one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub proposal: ProposalId,
    pub voter: AccountId,
    pub choice: VoteChoice,
    /// Total weight committed. Under [`VotePolicy::TopUp`] this is the sum of
    /// every accepted vote, so the record always matches what the tally holds.
    pub amount: VoteAmount,
    /// Number of accepted votes folded into this record (always 1 under
    /// [`VotePolicy::SingleVote`]).
    pub vote_count: u32,
    pub first_cast_at: Timestamp,
    pub last_cast_at: Timestamp,
}

/// Every vote cast, keyed by `(proposal, voter)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoteLedger {
    records: BTreeMap<(ProposalId, AccountId), VoteRecord>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, proposal: ProposalId, voter: &AccountId) -> bool {
        self.records.contains_key(&(proposal, voter.clone()))
    }

    pub fn get(&self, proposal: ProposalId, voter: &AccountId) -> Option<&VoteRecord> {
        self.records.get(&(proposal, voter.clone()))
    }

    /// Check whether `voter` may vote `choice` under `policy` without
    /// touching the ledger. Returns the record a new vote would extend.
    pub fn check(
        &self,
        proposal: ProposalId,
        voter: &AccountId,
        choice: VoteChoice,
        policy: VotePolicy,
    ) -> Result<Option<&VoteRecord>, GovernanceError> {
        let Some(existing) = self.get(proposal, voter) else {
            return Ok(None);
        };
        match policy {
            VotePolicy::SingleVote => Err(GovernanceError::AlreadyVoted {
                proposal,
                voter: voter.clone(),
            }),
            VotePolicy::TopUp if existing.choice != choice => {
                Err(GovernanceError::ChoiceMismatch {
                    proposal,
                    voter: voter.clone(),
                    recorded: existing.choice,
                })
            }
            VotePolicy::TopUp => Ok(Some(existing)),
        }
    }

    /// Record a vote and return the record it replaced, if any.
    ///
    /// Applies the same rules as [`VoteLedger::check`]; on error the ledger
    /// is unchanged.
    pub fn record(
        &mut self,
        proposal: ProposalId,
        voter: &AccountId,
        amount: VoteAmount,
        choice: VoteChoice,
        now: Timestamp,
        policy: VotePolicy,
    ) -> Result<Option<VoteRecord>, GovernanceError> {
        let previous = self.check(proposal, voter, choice, policy)?.cloned();
        let record = match &previous {
            Some(existing) => VoteRecord {
                amount: existing
                    .amount
                    .checked_add(amount)
                    .ok_or(GovernanceError::Overflow("vote record amount"))?,
                vote_count: existing
                    .vote_count
                    .checked_add(1)
                    .ok_or(GovernanceError::Overflow("vote count"))?,
                last_cast_at: now,
                ..existing.clone()
            },
            None => VoteRecord {
                proposal,
                voter: voter.clone(),
                choice,
                amount,
                vote_count: 1,
                first_cast_at: now,
                last_cast_at: now,
            },
        };
        self.records.insert((proposal, voter.clone()), record);
        Ok(previous)
    }

    /// Undo a `record` call by putting back what it returned.
    pub(crate) fn restore(
        &mut self,
        proposal: ProposalId,
        voter: &AccountId,
        previous: Option<VoteRecord>,
    ) {
        let key = (proposal, voter.clone());
        match previous {
            Some(record) => {
                self.records.insert(key, record);
            }
            None => {
                self.records.remove(&key);
            }
        }
    }

    /// All records for one proposal, ordered by voter.
    pub fn votes_for(&self, proposal: ProposalId) -> impl Iterator<Item = &VoteRecord> {
        self.records
            .range((proposal, AccountId::new(""))..)
            .take_while(move |((id, _), _)| *id == proposal)
            .map(|(_, record)| record)
    }

    /// Sum of committed weight on one proposal, per side: `(yes, no)`.
    pub fn committed(
        &self,
        proposal: ProposalId,
    ) -> Result<(VoteAmount, VoteAmount), GovernanceError> {
        let mut yes = VoteAmount::ZERO;
        let mut no = VoteAmount::ZERO;
        for record in self.votes_for(proposal) {
            let side = match record.choice {
                VoteChoice::Yes => &mut yes,
                VoteChoice::No => &mut no,
            };
            *side = side
                .checked_add(record.amount)
                .ok_or(GovernanceError::Overflow("committed weight"))?;
        }
        Ok((yes, no))
    }

    /// Every record, ordered by proposal then voter.
    pub fn iter(&self) -> impl Iterator<Item = &VoteRecord> {
        self.records.values()
    }

    pub(crate) fn entries(
        &self,
    ) -> impl Iterator<Item = (&(ProposalId, AccountId), &VoteRecord)> {
        self.records.iter()
    }

    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, key: (ProposalId, AccountId), record: VoteRecord) {
        self.records.insert(key, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
