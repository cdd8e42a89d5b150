use crate::chess::{Outcome, PlayerId};
use crate::game::GameState;
use crate::rules::{DuplicateRule, InvalidRule, PieceRule};
use derive_more::{Display, Error};
use std::{mem, time::Instant};
use tracing::{info, instrument, warn};

mod ballot;
mod proposal;

pub use ballot::*;
pub use proposal::*;

/// The reason why a proposal was refused.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ProposeError {
    #[display(fmt = "the match is over")]
    GameOver,

    #[display(fmt = "another proposal is awaiting votes")]
    AnotherPending,

    #[display(fmt = "{_0} is not playing this match")]
    NotAPlayer(#[error(not(source))] PlayerId),

    #[display(fmt = "{_0}")]
    Invalid(InvalidRule),

    #[display(fmt = "{_0}")]
    AlreadyDefined(DuplicateRule),
}

/// The reason why a vote was refused.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum VoteError {
    #[display(fmt = "the match is over")]
    GameOver,

    #[display(fmt = "there is no proposal to vote on")]
    NoProposal,

    #[display(fmt = "the proposer cannot vote on their own proposal")]
    Proposer,

    #[display(fmt = "{_0}")]
    Ignored(VoteIgnored),

    #[display(fmt = "{_0}")]
    Stale(DuplicateRule),
}

/// The reason why a proposal could not be withdrawn.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum WithdrawError {
    #[display(fmt = "there is no proposal to withdraw")]
    NoProposal,

    #[display(fmt = "only the proposer may withdraw a proposal")]
    NotProposer,
}

/// The amendment phase of a match.
///
/// At most one proposal is pending at any time and once the match ends
/// nothing else is accepted.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    ProposalPending(Pending),
    Ended(Outcome),
}

impl Phase {
    /// The pending proposal, if any.
    pub fn pending(&self) -> Option<&Pending> {
        match self {
            Phase::ProposalPending(p) => Some(p),
            _ => None,
        }
    }

    /// How the match ended, if it did.
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Phase::Ended(o) => Some(o),
            _ => None,
        }
    }

    /// Whether the match is over.
    pub fn is_ended(&self) -> bool {
        self.outcome().is_some()
    }

    /// The instant past which the pending proposal lapses, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending()?.deadline()
    }

    /// Ends the match, discarding any pending proposal.
    pub fn end(&mut self, outcome: Outcome) {
        *self = Phase::Ended(outcome);
    }

    /// Opens a vote on `rule`, every player but the proposer is eligible.
    #[instrument(level = "debug", skip(self, state), err)]
    pub fn propose(
        &mut self,
        state: &GameState,
        proposer: &PlayerId,
        rule: PieceRule,
        deadline: Option<Instant>,
    ) -> Result<Proposal, ProposeError> {
        match self {
            Phase::Ended(_) => return Err(ProposeError::GameOver),
            Phase::ProposalPending(_) => return Err(ProposeError::AnotherPending),
            Phase::Idle => {}
        }

        if !state.is_player(proposer) {
            return Err(ProposeError::NotAPlayer(proposer.clone()));
        }

        rule.validate().map_err(ProposeError::Invalid)?;

        if state.rules().contains(&rule.name) {
            return Err(ProposeError::AlreadyDefined(DuplicateRule { name: rule.name }));
        }

        let voters = state.players().into_iter().filter(|&p| p != proposer);
        let ballot = Ballot::new(voters.cloned());
        let proposal = Proposal::new(proposer.clone(), rule);

        info!(%proposal, "vote requested");

        *self = Phase::ProposalPending(Pending {
            proposal: proposal.clone(),
            ballot,
            deadline,
        });

        Ok(proposal)
    }

    /// Records a vote on the pending proposal and resolves it once decided.
    ///
    /// An accepted rule is adopted, a rejected rule counts as a disagreement.
    #[instrument(level = "debug", skip(self, state), err)]
    pub fn vote(
        &mut self,
        state: &mut GameState,
        voter: &PlayerId,
        accept: bool,
    ) -> Result<Resolution, VoteError> {
        let pending = match self {
            Phase::Ended(_) => return Err(VoteError::GameOver),
            Phase::Idle => return Err(VoteError::NoProposal),
            Phase::ProposalPending(p) => p,
        };

        if voter == &pending.proposal.proposer {
            return Err(VoteError::Proposer);
        }

        match pending.ballot.cast(voter, accept) {
            Err(e) => Err(VoteError::Ignored(e)),
            Ok(Tally::Undecided) => Ok(Resolution::Undecided),
            Ok(Tally::Accepted) => {
                let Pending { proposal, .. } =
                    self.take_pending().ok_or(VoteError::NoProposal)?;

                state.adopt(proposal.rule.clone()).map_err(VoteError::Stale)?;
                info!(rule = %proposal.rule, "rule committed");
                Ok(Resolution::Committed(proposal.rule))
            }

            Ok(Tally::Rejected) => {
                let Pending { proposal, .. } =
                    self.take_pending().ok_or(VoteError::NoProposal)?;

                Ok(self.reject(state, proposal, RejectReason::Votes))
            }
        }
    }

    /// Rejects the pending proposal if it lapsed by `now`.
    #[instrument(level = "debug", skip(self, state))]
    pub fn expire(&mut self, state: &mut GameState, now: Instant) -> Option<Resolution> {
        if !self.pending()?.is_expired(now) {
            return None;
        }

        let Pending { proposal, .. } = self.take_pending()?;
        Some(self.reject(state, proposal, RejectReason::Expired))
    }

    /// Cancels the pending proposal on behalf of its proposer.
    ///
    /// Withdrawing does not count as a disagreement.
    #[instrument(level = "debug", skip(self), err)]
    pub fn withdraw(&mut self, player: &PlayerId) -> Result<Proposal, WithdrawError> {
        let pending = self.pending().ok_or(WithdrawError::NoProposal)?;
        if &pending.proposal.proposer != player {
            return Err(WithdrawError::NotProposer);
        }

        let Pending { proposal, .. } = self.take_pending().ok_or(WithdrawError::NoProposal)?;
        info!(%proposal, "proposal withdrawn");
        Ok(proposal)
    }

    fn take_pending(&mut self) -> Option<Pending> {
        match mem::take(self) {
            Phase::ProposalPending(p) => Some(p),
            other => {
                *self = other;
                None
            }
        }
    }

    fn reject(
        &mut self,
        state: &mut GameState,
        proposal: Proposal,
        reason: RejectReason,
    ) -> Resolution {
        let outcome = state.disagree().then_some(Outcome::Doomsday);

        warn!(
            %proposal,
            %reason,
            disagreements = state.disagreement_count(),
            "proposal rejected"
        );

        *self = match &outcome {
            Some(o) => Phase::Ended(o.clone()),
            None => Phase::Idle,
        };

        Resolution::Rejected {
            rule: proposal.rule,
            reason,
            outcome,
        }
    }
}
