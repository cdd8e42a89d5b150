use crate::chess::{OutOfBounds, PlayerId};
use crate::consensus::{ProposeError, VoteError, VoteIgnored, WithdrawError};
use crate::game::{MoveError, SpawnError};
use crate::rules::IllegalMove;
use derive_more::{Display, Error};

/// The broad category of a [`Rejection`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The intent was malformed or referenced something that does not exist.
    #[display(fmt = "input error")]
    Input,

    /// The intent was well formed, but the rules forbid it right now.
    #[display(fmt = "rule violation")]
    RuleViolation,

    /// The intent arrived out of sequence and is ignored.
    #[display(fmt = "protocol error")]
    Protocol,

    /// The match is over.
    #[display(fmt = "terminal")]
    Terminal,
}

/// The reason why a player could not take a seat.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum JoinError {
    #[display(fmt = "the match already has two players")]
    GameFull,

    #[display(fmt = "the name `{_0}` is taken")]
    NameTaken(#[error(not(source))] String),

    #[display(fmt = "the name must not be empty")]
    EmptyName,

    #[display(fmt = "you have already joined")]
    AlreadyJoined,
}

/// The reason why an intent was refused.
///
/// A refused intent never changes the state of the match.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum Rejection {
    #[display(fmt = "{_0}")]
    Join(JoinError),

    #[display(fmt = "the match has not started yet")]
    NotStarted,

    #[display(fmt = "the match is over")]
    GameOver,

    #[display(fmt = "a proposal is awaiting votes")]
    VotePending,

    #[display(fmt = "you may only spawn on your turn, it is {_0}'s turn")]
    OutOfTurn(#[error(not(source))] PlayerId),

    #[display(fmt = "{_0}")]
    OutOfBounds(OutOfBounds),

    #[display(fmt = "{_0}")]
    Move(MoveError),

    #[display(fmt = "{_0}")]
    Spawn(SpawnError),

    #[display(fmt = "{_0}")]
    Propose(ProposeError),

    #[display(fmt = "{_0}")]
    Vote(VoteError),

    #[display(fmt = "{_0}")]
    Withdraw(WithdrawError),
}

impl Rejection {
    /// The category this rejection falls into.
    pub fn kind(&self) -> ErrorKind {
        use ErrorKind::*;

        match self {
            Rejection::Join(JoinError::AlreadyJoined) => Protocol,
            Rejection::Join(_) => Input,
            Rejection::NotStarted => RuleViolation,
            Rejection::GameOver => Terminal,
            Rejection::VotePending => RuleViolation,
            Rejection::OutOfTurn(_) => RuleViolation,
            Rejection::OutOfBounds(_) => Input,

            Rejection::Move(MoveError::NotAPlayer(_)) => Protocol,
            Rejection::Move(MoveError::NotYourTurn(_)) => RuleViolation,
            Rejection::Move(MoveError::Illegal(IllegalMove::UnknownPieceType(_))) => Input,
            Rejection::Move(MoveError::Illegal(_)) => RuleViolation,

            Rejection::Spawn(SpawnError::NotAPlayer(_)) => Protocol,
            Rejection::Spawn(SpawnError::UnknownPieceType(_)) => Input,
            Rejection::Spawn(SpawnError::Occupied(_)) => RuleViolation,

            Rejection::Propose(ProposeError::GameOver) => Terminal,
            Rejection::Propose(ProposeError::AnotherPending) => RuleViolation,
            Rejection::Propose(ProposeError::NotAPlayer(_)) => Protocol,
            Rejection::Propose(ProposeError::Invalid(_)) => Input,
            Rejection::Propose(ProposeError::AlreadyDefined(_)) => Input,

            Rejection::Vote(VoteError::GameOver) => Terminal,
            Rejection::Vote(VoteError::NoProposal) => Protocol,
            Rejection::Vote(VoteError::Proposer) => RuleViolation,
            Rejection::Vote(VoteError::Ignored(VoteIgnored::AlreadyVoted(_))) => RuleViolation,
            Rejection::Vote(VoteError::Ignored(VoteIgnored::NotEligible(_))) => RuleViolation,
            Rejection::Vote(VoteError::Stale(_)) => Protocol,

            Rejection::Withdraw(WithdrawError::NoProposal) => Protocol,
            Rejection::Withdraw(WithdrawError::NotProposer) => RuleViolation,
        }
    }

    /// Whether the sender should be told about this rejection.
    ///
    /// Protocol errors are ignored, everything else is reported back to the sender only.
    pub fn is_reported(&self) -> bool {
        self.kind() != ErrorKind::Protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Coord;
    use crate::rules::InvalidRule;

    #[test]
    fn malformed_proposals_are_input_errors() {
        let r = Rejection::Propose(ProposeError::Invalid(InvalidRule::NoCapabilities));
        assert_eq!(r.kind(), ErrorKind::Input);
        assert!(r.is_reported());
    }

    #[test]
    fn votes_without_proposal_are_ignored() {
        let r = Rejection::Vote(VoteError::NoProposal);
        assert_eq!(r.kind(), ErrorKind::Protocol);
        assert!(!r.is_reported());
    }

    #[test]
    fn double_votes_violate_the_rules() {
        let r = Rejection::Vote(VoteError::Ignored(VoteIgnored::AlreadyVoted("a".into())));
        assert_eq!(r.kind(), ErrorKind::RuleViolation);
    }

    #[test]
    fn illegal_moves_violate_the_rules() {
        let at = Coord::new(0, 0).unwrap();
        let r = Rejection::Move(MoveError::Illegal(IllegalMove::EmptySource(at)));
        assert_eq!(r.kind(), ErrorKind::RuleViolation);
        assert_eq!(r.to_string(), "there is no piece on (0, 0)");
    }

    #[test]
    fn refusals_after_the_match_are_terminal() {
        assert_eq!(Rejection::GameOver.kind(), ErrorKind::Terminal);
        assert_eq!(Rejection::Vote(VoteError::GameOver).kind(), ErrorKind::Terminal);
    }
}
