use crate::chess::PlayerId;
use derive_more::{Display, Error};
use std::collections::BTreeMap;

/// A voter's position on a proposal.
#[derive(Debug, Display, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Vote {
    #[default]
    #[display(fmt = "pending")]
    Pending,
    #[display(fmt = "accept")]
    Accept,
    #[display(fmt = "reject")]
    Reject,
}

/// The result of counting a [`Ballot`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tally {
    #[display(fmt = "undecided")]
    Undecided,
    #[display(fmt = "accepted")]
    Accepted,
    #[display(fmt = "rejected")]
    Rejected,
}

/// The reason why a vote was not counted.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Error)]
pub enum VoteIgnored {
    #[display(fmt = "{_0} is not eligible to vote")]
    NotEligible(#[error(not(source))] PlayerId),

    #[display(fmt = "{_0} has already voted")]
    AlreadyVoted(#[error(not(source))] PlayerId),
}

/// The votes on a single proposal.
///
/// A proposal passes only if every eligible voter accepts it,
/// a single rejection is decisive.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Ballot(BTreeMap<PlayerId, Vote>);

impl Ballot {
    /// A ballot where every voter is still pending.
    pub fn new<I: IntoIterator<Item = PlayerId>>(voters: I) -> Self {
        Ballot(voters.into_iter().map(|v| (v, Vote::Pending)).collect())
    }

    /// Whether `voter` may cast a vote on this ballot.
    pub fn is_eligible(&self, voter: &PlayerId) -> bool {
        self.0.contains_key(voter)
    }

    /// The current position of `voter`, if eligible.
    pub fn vote_of(&self, voter: &PlayerId) -> Option<Vote> {
        self.0.get(voter).copied()
    }

    /// Records the vote of `voter` and counts the ballot.
    ///
    /// Each voter votes at most once, repeated votes are ignored.
    pub fn cast(&mut self, voter: &PlayerId, accept: bool) -> Result<Tally, VoteIgnored> {
        match self.0.get_mut(voter) {
            None => Err(VoteIgnored::NotEligible(voter.clone())),
            Some(Vote::Accept | Vote::Reject) => Err(VoteIgnored::AlreadyVoted(voter.clone())),
            Some(v) => {
                *v = if accept { Vote::Accept } else { Vote::Reject };
                Ok(self.tally())
            }
        }
    }

    /// Counts the votes cast so far.
    pub fn tally(&self) -> Tally {
        if self.0.values().any(|v| *v == Vote::Reject) {
            Tally::Rejected
        } else if self.0.values().all(|v| *v == Vote::Accept) {
            Tally::Accepted
        } else {
            Tally::Undecided
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assume;
    use test_strategy::proptest;

    #[proptest]
    fn single_voter_decides(voter: PlayerId, accept: bool) {
        let mut ballot = Ballot::new([voter.clone()]);
        assert_eq!(ballot.tally(), Tally::Undecided);

        let expected = if accept {
            Tally::Accepted
        } else {
            Tally::Rejected
        };

        assert_eq!(ballot.cast(&voter, accept), Ok(expected));
    }

    #[proptest]
    fn acceptance_requires_every_voter(a: PlayerId, b: PlayerId) {
        prop_assume!(a != b);

        let mut ballot = Ballot::new([a.clone(), b.clone()]);
        assert_eq!(ballot.cast(&a, true), Ok(Tally::Undecided));
        assert_eq!(ballot.cast(&b, true), Ok(Tally::Accepted));
    }

    #[proptest]
    fn any_rejection_is_decisive(a: PlayerId, b: PlayerId) {
        prop_assume!(a != b);

        let mut ballot = Ballot::new([a.clone(), b.clone()]);
        assert_eq!(ballot.cast(&a, false), Ok(Tally::Rejected));
        assert_eq!(ballot.vote_of(&b), Some(Vote::Pending));
    }

    #[proptest]
    fn voters_vote_at_most_once(voter: PlayerId, first: bool, second: bool) {
        let mut ballot = Ballot::new([voter.clone()]);
        let tally = ballot.cast(&voter, first)?;

        assert_eq!(
            ballot.cast(&voter, second),
            Err(VoteIgnored::AlreadyVoted(voter.clone()))
        );

        assert_eq!(ballot.tally(), tally);
    }

    #[proptest]
    fn ineligible_voters_are_ignored(voter: PlayerId, stranger: PlayerId, accept: bool) {
        prop_assume!(voter != stranger);

        let mut ballot = Ballot::new([voter]);
        assert!(!ballot.is_eligible(&stranger));
        assert_eq!(
            ballot.cast(&stranger, accept),
            Err(VoteIgnored::NotEligible(stranger.clone()))
        );

        assert_eq!(ballot.tally(), Tally::Undecided);
    }
}
