//! Core governance engine: proposal creation, weighted voting, finalization.

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::ledger::VoteRecord;
use crate::proposal::{Proposal, ProposalOutcome, VoteChoice};
use crate::state::GovernanceState;
use ballot_store::BalanceStore;
use ballot_types::{AccountId, Clock, GovernanceParams, ProposalId, Timestamp, VoteAmount};
use tracing::{debug, info};

/// Orchestrates the proposal lifecycle against an injected clock and
/// balance registry.
///
/// Every mutating operation takes `&mut self` and runs to completion, so
/// operations are applied one at a time in call order. Each reads the clock
/// once. A failed operation leaves the proposal table, the vote table and the
/// registry exactly as they were.
pub struct GovernanceEngine<C, B> {
    params: GovernanceParams,
    clock: C,
    balances: B,
    state: GovernanceState,
}

impl<C: Clock, B: BalanceStore> GovernanceEngine<C, B> {
    pub fn new(params: GovernanceParams, clock: C, balances: B) -> Result<Self, GovernanceError> {
        Self::with_state(params, clock, balances, GovernanceState::new())
    }

    /// Resume from previously saved state.
    pub fn with_state(
        params: GovernanceParams,
        clock: C,
        balances: B,
        state: GovernanceState,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            params,
            clock,
            balances,
            state,
        })
    }

    pub fn from_config(
        config: &GovernanceConfig,
        clock: C,
        balances: B,
    ) -> Result<Self, GovernanceError> {
        Self::new(config.params(), clock, balances)
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Open a new proposal. Voting starts now and runs for the configured
    /// voting period. Any account may propose.
    pub fn create_proposal(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        proposer: AccountId,
    ) -> Result<ProposalId, GovernanceError> {
        let title = title.into();
        let description = description.into();
        let now = self.clock.now();

        check_text("title", &title, self.params.max_title_len)?;
        check_text("description", &description, self.params.max_description_len)?;

        let id = self.state.proposals.create(
            title,
            description,
            proposer.clone(),
            now,
            self.params.voting_period,
        )?;
        info!(
            proposal = %id,
            %proposer,
            start = %now,
            voting_period = self.params.voting_period,
            "proposal created"
        );
        Ok(id)
    }

    /// Commit `amount` of `voter`'s balance to `choice` on proposal `id`.
    ///
    /// Checks, in order: the proposal exists, the window is open, the
    /// proposal is active, the amount is non-zero, the vote policy admits
    /// this voter, and the balance covers the amount. On success the
    /// balance is debited, the vote recorded and the tally updated together.
    pub fn cast_vote(
        &mut self,
        id: ProposalId,
        amount: VoteAmount,
        choice: VoteChoice,
        voter: &AccountId,
    ) -> Result<(), GovernanceError> {
        self.vote_with(id, amount, voter, || Ok(choice))
    }

    /// [`GovernanceEngine::cast_vote`] for a textual choice (`"yes"` / `"no"`).
    ///
    /// The choice is parsed after the proposal and window checks, so an
    /// ended or closed proposal reports that before a malformed choice.
    pub fn cast_vote_str(
        &mut self,
        id: ProposalId,
        amount: VoteAmount,
        choice: &str,
        voter: &AccountId,
    ) -> Result<(), GovernanceError> {
        self.vote_with(id, amount, voter, || choice.parse())
    }

    /// Close voting on `id` and fix its outcome: passed on a strict yes
    /// majority, rejected otherwise.
    pub fn finalize_proposal(&mut self, id: ProposalId) -> Result<ProposalOutcome, GovernanceError> {
        let now = self.clock.now();
        let result = self.try_finalize(id, now);
        match &result {
            Ok(outcome) => {
                if let Ok(proposal) = self.state.proposals.get(id) {
                    info!(
                        proposal = %id,
                        %outcome,
                        yes = %proposal.yes_votes,
                        no = %proposal.no_votes,
                        "proposal finalized"
                    );
                }
            }
            Err(e) => debug!(proposal = %id, error = %e, "finalize rejected"),
        }
        result
    }

    fn try_finalize(
        &mut self,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<ProposalOutcome, GovernanceError> {
        let proposal = self.state.proposals.get(id)?;
        if !proposal.window_closed_at(now) {
            return Err(GovernanceError::VotingPeriodNotEnded {
                proposal: id,
                end_time: proposal.end_time,
                now,
            });
        }
        self.state.proposals.finalize(id)
    }

    fn vote_with(
        &mut self,
        id: ProposalId,
        amount: VoteAmount,
        voter: &AccountId,
        choice: impl FnOnce() -> Result<VoteChoice, GovernanceError>,
    ) -> Result<(), GovernanceError> {
        let now = self.clock.now();
        let result = self.try_vote(id, amount, voter, choice, now);
        match &result {
            Ok(choice) => info!(
                proposal = %id,
                voter = %voter,
                %amount,
                %choice,
                "vote committed"
            ),
            Err(e) => debug!(proposal = %id, voter = %voter, error = %e, "vote rejected"),
        }
        result.map(|_| ())
    }

    fn try_vote(
        &mut self,
        id: ProposalId,
        amount: VoteAmount,
        voter: &AccountId,
        choice: impl FnOnce() -> Result<VoteChoice, GovernanceError>,
        now: Timestamp,
    ) -> Result<VoteChoice, GovernanceError> {
        let policy = self.params.vote_policy;

        let proposal = self.state.proposals.get(id)?;
        if now > proposal.end_time {
            return Err(GovernanceError::VotingPeriodEnded {
                proposal: id,
                end_time: proposal.end_time,
                now,
            });
        }
        if proposal.status.is_terminal() {
            return Err(GovernanceError::ProposalNotActive {
                proposal: id,
                status: proposal.status,
            });
        }
        let choice = choice()?;
        if amount.is_zero() {
            return Err(GovernanceError::ZeroAmount);
        }
        self.state.votes.check(id, voter, choice, policy)?;
        let available = self.balances.balance_of(voter)?;
        if available < amount {
            return Err(GovernanceError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let prior_tally = proposal.tally(choice);

        // The in-memory tables are updated first so every failure can be
        // undone locally; the registry debit is the last, irreversible step.
        let previous = self
            .state
            .votes
            .record(id, voter, amount, choice, now, policy)?;
        if let Err(e) = self.state.proposals.apply_vote(id, choice, amount) {
            self.state.votes.restore(id, voter, previous);
            return Err(e);
        }
        if let Err(e) = self.balances.debit(voter, amount) {
            self.state.proposals.restore_tally(id, choice, prior_tally);
            self.state.votes.restore(id, voter, previous);
            return Err(e.into());
        }
        Ok(choice)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.state.proposals.get(id)
    }

    pub fn vote(&self, id: ProposalId, voter: &AccountId) -> Option<&VoteRecord> {
        self.state.votes.get(id, voter)
    }

    pub fn has_voted(&self, id: ProposalId, voter: &AccountId) -> bool {
        self.state.votes.has_voted(id, voter)
    }

    pub fn votes_for(&self, id: ProposalId) -> impl Iterator<Item = &VoteRecord> {
        self.state.votes.votes_for(id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.state.proposals.iter()
    }

    /// Proposals that have not been finalized yet (their window may have closed).
    pub fn active_proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.state
            .proposals
            .iter()
            .filter(|proposal| proposal.status.is_active())
    }

    pub fn proposal_count(&self) -> usize {
        self.state.proposals.len()
    }

    /// Total weight committed to `id` across both sides.
    pub fn total_committed(&self, id: ProposalId) -> Result<VoteAmount, GovernanceError> {
        self.proposal(id)?
            .total_votes()
            .ok_or(GovernanceError::Overflow("total committed weight"))
    }

    /// Whether a vote on `id` submitted now would pass the window and status checks.
    pub fn is_voting_open(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        let now = self.clock.now();
        Ok(self.proposal(id)?.accepts_votes_at(now))
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn balances(&self) -> &B {
        &self.balances
    }

    pub fn state(&self) -> &GovernanceState {
        &self.state
    }

    /// Administrative access to the tables, for simulating elapsed time.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn state_mut(&mut self) -> &mut GovernanceState {
        &mut self.state
    }

    pub fn into_state(self) -> GovernanceState {
        self.state
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), GovernanceError> {
    if value.trim().is_empty() {
        return Err(GovernanceError::EmptyField(field));
    }
    if value.len() > max {
        return Err(GovernanceError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::proposal::ProposalStatus;
    use ballot_nullables::{NullBalanceStore, NullClock};
    use ballot_store::StoreError;
    use ballot_types::VotePolicy;

    const PERIOD: u64 = 1440;

    type Engine = GovernanceEngine<NullClock, NullBalanceStore>;

    fn account(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn amount(raw: u128) -> VoteAmount {
        VoteAmount::new(raw)
    }

    fn engine_with(policy: VotePolicy, balances: &[(&str, u128)]) -> Engine {
        let params = GovernanceParams {
            voting_period: PERIOD,
            vote_policy: policy,
            ..GovernanceParams::default()
        };
        let store = NullBalanceStore::with_balances(balances.iter().copied());
        GovernanceEngine::new(params, NullClock::new(1_000), store).unwrap()
    }

    fn engine(balances: &[(&str, u128)]) -> Engine {
        engine_with(VotePolicy::SingleVote, balances)
    }

    fn propose(engine: &mut Engine) -> ProposalId {
        engine
            .create_proposal(
                "Implement Quantum Resistant Algorithms",
                "Upgrade the system with quantum-resistant algorithms",
                account("member1"),
            )
            .unwrap()
    }

    /// Registry that reports balances but refuses every debit.
    struct FailingDebit(NullBalanceStore);

    impl BalanceStore for FailingDebit {
        fn balance_of(&self, account: &AccountId) -> Result<VoteAmount, StoreError> {
            self.0.balance_of(account)
        }

        fn debit(&self, _: &AccountId, _: VoteAmount) -> Result<VoteAmount, StoreError> {
            Err(StoreError::Backend("ledger unavailable".into()))
        }
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = GovernanceParams {
            voting_period: 0,
            ..GovernanceParams::default()
        };
        let result = GovernanceEngine::new(params, NullClock::new(0), NullBalanceStore::new());
        assert!(matches!(result, Err(GovernanceError::Params(_))));
    }

    #[test]
    fn create_stamps_window_from_clock() {
        let mut engine = engine(&[]);
        let id = propose(&mut engine);
        let p = engine.proposal(id).unwrap();
        assert_eq!(p.start_time, Timestamp::new(1_000));
        assert_eq!(p.end_time, Timestamp::new(1_000 + PERIOD));
        assert_eq!(p.proposer, account("member1"));
        assert_eq!(p.status, ProposalStatus::Active);
    }

    #[test]
    fn create_validates_text() {
        let mut engine = engine(&[]);
        let err = engine
            .create_proposal("  ", "body", account("m"))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::EmptyField("title")));

        let err = engine.create_proposal("t", "", account("m")).unwrap_err();
        assert!(matches!(err, GovernanceError::EmptyField("description")));

        let long = "x".repeat(GovernanceParams::DEFAULT_MAX_TITLE_LEN + 1);
        let err = engine.create_proposal(long, "body", account("m")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(engine.proposal_count(), 0);
    }

    #[test]
    fn vote_debits_records_and_tallies() {
        let mut engine = engine(&[("voter1", 1000)]);
        let id = propose(&mut engine);
        engine
            .cast_vote(id, amount(500), VoteChoice::Yes, &account("voter1"))
            .unwrap();

        assert_eq!(engine.balances().get(&account("voter1")), amount(500));
        assert_eq!(engine.proposal(id).unwrap().yes_votes, amount(500));
        let record = engine.vote(id, &account("voter1")).unwrap();
        assert_eq!(record.amount, amount(500));
        assert_eq!(record.choice, VoteChoice::Yes);
        assert_eq!(record.first_cast_at, Timestamp::new(1_000));
    }

    #[test]
    fn vote_at_end_time_is_accepted() {
        let mut engine = engine(&[("v", 10)]);
        let id = propose(&mut engine);
        engine.clock().advance(PERIOD);
        assert!(engine.is_voting_open(id).unwrap());
        engine
            .cast_vote(id, amount(1), VoteChoice::No, &account("v"))
            .unwrap();
    }

    #[test]
    fn ended_window_reported_before_bad_choice_and_balance() {
        let mut engine = engine(&[]);
        let id = propose(&mut engine);
        engine.clock().advance(PERIOD + 1);
        let err = engine
            .cast_vote_str(id, amount(10_000), "maybe", &account("nobody"))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::VotingPeriodEnded { .. }));
    }

    #[test]
    fn finalized_proposal_reported_before_bad_choice_and_balance() {
        let mut engine = engine(&[("late", 100)]);
        let id = propose(&mut engine);
        engine.clock().advance(PERIOD);
        assert_eq!(
            engine.finalize_proposal(id).unwrap(),
            ProposalOutcome::Rejected
        );
        let err = engine
            .cast_vote_str(id, amount(10_000), "maybe", &account("late"))
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::ProposalNotActive {
                status: ProposalStatus::Rejected,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(
            engine.balances().balance_of(&account("late")).unwrap(),
            amount(100)
        );
        assert!(!engine.has_voted(id, &account("late")));
    }

    #[test]
    fn bad_choice_reported_before_balance() {
        let mut engine = engine(&[]);
        let id = propose(&mut engine);
        let err = engine
            .cast_vote_str(id, amount(10), "abstain", &account("poor"))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidChoice(ref c) if c == "abstain"));
        let err = engine
            .cast_vote_str(id, amount(0), "YES", &account("poor"))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ZeroAmount));
    }

    #[test]
    fn zero_amount_rejected() {
        let mut engine = engine(&[("v", 10)]);
        let id = propose(&mut engine);
        let err = engine
            .cast_vote(id, VoteAmount::ZERO, VoteChoice::Yes, &account("v"))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ZeroAmount));
        assert!(!engine.has_voted(id, &account("v")));
    }

    #[test]
    fn already_voted_reported_before_balance() {
        let mut engine = engine(&[("v", 10)]);
        let id = propose(&mut engine);
        engine
            .cast_vote(id, amount(10), VoteChoice::Yes, &account("v"))
            .unwrap();
        let err = engine
            .cast_vote(id, amount(10), VoteChoice::Yes, &account("v"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyVoted);
        assert_eq!(engine.proposal(id).unwrap().yes_votes, amount(10));
    }

    #[test]
    fn top_up_policy_accumulates_weight() {
        let mut engine = engine_with(VotePolicy::TopUp, &[("v", 100)]);
        let id = propose(&mut engine);
        engine
            .cast_vote(id, amount(30), VoteChoice::Yes, &account("v"))
            .unwrap();
        engine.clock().advance(5);
        engine
            .cast_vote(id, amount(20), VoteChoice::Yes, &account("v"))
            .unwrap();

        let record = engine.vote(id, &account("v")).unwrap();
        assert_eq!(record.amount, amount(50));
        assert_eq!(record.vote_count, 2);
        assert_eq!(engine.proposal(id).unwrap().yes_votes, amount(50));
        assert_eq!(engine.balances().get(&account("v")), amount(50));

        let err = engine
            .cast_vote(id, amount(1), VoteChoice::No, &account("v"))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ChoiceMismatch { .. }));
        assert_eq!(engine.balances().get(&account("v")), amount(50));
    }

    #[test]
    fn failed_debit_rolls_back_record_and_tally() {
        let store = FailingDebit(NullBalanceStore::with_balances([("v", 100)]));
        let mut engine =
            GovernanceEngine::new(GovernanceParams::default(), NullClock::new(0), store).unwrap();
        let id = engine
            .create_proposal("t", "d", account("m"))
            .unwrap();

        let err = engine
            .cast_vote(id, amount(40), VoteChoice::No, &account("v"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(engine.proposal(id).unwrap().no_votes.is_zero());
        assert!(!engine.has_voted(id, &account("v")));
        assert_eq!(engine.balances().0.get(&account("v")), amount(100));
    }

    #[test]
    fn failed_debit_rolls_back_top_up() {
        let store = FailingDebit(NullBalanceStore::with_balances([("v", 100)]));
        let params = GovernanceParams {
            vote_policy: VotePolicy::TopUp,
            ..GovernanceParams::default()
        };
        let mut engine = GovernanceEngine::new(params, NullClock::new(0), store).unwrap();
        let id = engine.create_proposal("t", "d", account("m")).unwrap();

        // Seed an existing record directly, as if an earlier vote had landed.
        let state = engine.state_mut();
        state
            .votes
            .record(
                id,
                &account("v"),
                amount(10),
                VoteChoice::Yes,
                Timestamp::new(0),
                VotePolicy::TopUp,
            )
            .unwrap();
        state
            .proposals
            .apply_vote(id, VoteChoice::Yes, amount(10))
            .unwrap();

        engine
            .cast_vote(id, amount(5), VoteChoice::Yes, &account("v"))
            .unwrap_err();
        assert_eq!(engine.vote(id, &account("v")).unwrap().amount, amount(10));
        assert_eq!(engine.proposal(id).unwrap().yes_votes, amount(10));
    }

    #[test]
    fn tally_overflow_rejected_without_debit() {
        let mut engine = engine(&[("whale", u128::MAX), ("minnow", 1)]);
        let id = propose(&mut engine);
        engine
            .cast_vote(id, amount(u128::MAX), VoteChoice::Yes, &account("whale"))
            .unwrap();
        let err = engine
            .cast_vote(id, amount(1), VoteChoice::Yes, &account("minnow"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(engine.balances().get(&account("minnow")), amount(1));
        assert!(!engine.has_voted(id, &account("minnow")));
        assert!(matches!(
            engine.total_committed(id),
            Ok(total) if total == amount(u128::MAX)
        ));
    }

    #[test]
    fn end_time_override_allows_early_finalize() {
        let mut engine = engine(&[("voter4", 3000), ("voter5", 2000)]);
        let id = propose(&mut engine);
        engine
            .cast_vote(id, amount(3000), VoteChoice::Yes, &account("voter4"))
            .unwrap();
        engine
            .cast_vote(id, amount(2000), VoteChoice::No, &account("voter5"))
            .unwrap();

        let now = engine.clock().now();
        engine
            .state_mut()
            .proposals_mut()
            .override_end_time(id, Timestamp::new(now.get() - 1))
            .unwrap();

        assert_eq!(engine.finalize_proposal(id).unwrap(), ProposalOutcome::Passed);
        assert_eq!(engine.proposal(id).unwrap().status, ProposalStatus::Passed);
    }

    #[test]
    fn finalize_order_of_checks() {
        let mut engine = engine(&[]);
        let err = engine.finalize_proposal(ProposalId::new(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let id = propose(&mut engine);
        let err = engine.finalize_proposal(id).unwrap_err();
        assert!(matches!(err, GovernanceError::VotingPeriodNotEnded { .. }));

        engine.clock().advance(PERIOD);
        assert_eq!(engine.finalize_proposal(id).unwrap(), ProposalOutcome::Rejected);
        let err = engine.finalize_proposal(id).unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotActive { .. }));
        assert_eq!(engine.active_proposals().count(), 0);
    }

    #[test]
    fn independent_engines_do_not_share_ids() {
        let mut a = engine(&[]);
        let mut b = engine(&[]);
        assert_eq!(propose(&mut a), ProposalId::FIRST);
        assert_eq!(propose(&mut a), ProposalId::new(2));
        assert_eq!(propose(&mut b), ProposalId::FIRST);
    }

    #[test]
    fn resume_from_saved_state() {
        let mut engine = engine(&[("v", 10)]);
        let id = propose(&mut engine);
        engine
            .cast_vote(id, amount(7), VoteChoice::No, &account("v"))
            .unwrap();
        let bytes = engine.state().save_state().unwrap();

        let state = GovernanceState::load_state(&bytes).unwrap();
        let mut resumed = GovernanceEngine::with_state(
            GovernanceParams::default(),
            NullClock::new(1_000),
            NullBalanceStore::new(),
            state,
        )
        .unwrap();
        assert_eq!(resumed.proposal(id).unwrap().no_votes, amount(7));
        assert!(resumed.has_voted(id, &account("v")));
        let next = resumed.create_proposal("t2", "d2", account("m")).unwrap();
        assert_eq!(next, ProposalId::new(2));
    }
}
