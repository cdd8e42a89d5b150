use crate::chess::{Outcome, PlayerId};
use crate::consensus::Ballot;
use crate::rules::PieceRule;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A request to add a new piece type to the rules.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Constructor)]
#[display(fmt = "{proposer} proposes {rule}")]
pub struct Proposal {
    pub proposer: PlayerId,
    pub rule: PieceRule,
}

/// A [`Proposal`] awaiting votes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Pending {
    pub(super) proposal: Proposal,
    pub(super) ballot: Ballot,
    pub(super) deadline: Option<Instant>,
}

impl Pending {
    /// The proposal being voted on.
    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    /// The votes cast so far.
    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    /// The instant past which the proposal lapses, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the proposal lapsed by `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }
}

/// Why a proposal was rejected.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// A voter rejected it.
    #[display(fmt = "rejected by vote")]
    Votes,
    /// The vote was not concluded in time.
    #[display(fmt = "expired")]
    Expired,
}

/// What a vote or an expiry did to a pending proposal.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Resolution {
    /// More votes are needed.
    Undecided,
    /// The rule was adopted.
    Committed(PieceRule),
    /// The rule was discarded and a disagreement was counted,
    /// which may have ended the match.
    Rejected {
        rule: PieceRule,
        reason: RejectReason,
        outcome: Option<Outcome>,
    },
}
