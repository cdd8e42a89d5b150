use crate::chess::{Coord, Outcome, PlayerId};
use crate::consensus::RejectReason;
use crate::game::GameState;
use crate::rules::PieceRule;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The reason why parsing a message failed.
#[derive(Debug, Display, Error)]
#[display(fmt = "failed to parse message")]
pub struct ParseMessageError(serde_json::Error);

/// A request sent by a client.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    /// Take a seat in the match.
    Join { name: String },

    /// Move the piece on `from` to `to`.
    Move { from: Coord, to: Coord },

    /// Ask the other players to adopt a new piece type.
    ProposeRule { rule: PieceRule },

    /// Vote on the pending proposal.
    Vote { accept: bool },

    /// Place a new piece on an empty cell.
    Spawn {
        #[serde(rename = "pieceTypeName")]
        piece_type: String,
        x: u8,
        y: u8,
    },

    /// Cancel one's own pending proposal.
    Withdraw,
}

impl Intent {
    /// The message tag, as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Join { .. } => "join",
            Intent::Move { .. } => "move",
            Intent::ProposeRule { .. } => "propose_rule",
            Intent::Vote { .. } => "vote",
            Intent::Spawn { .. } => "spawn",
            Intent::Withdraw => "withdraw",
        }
    }
}

impl FromStr for Intent {
    type Err = ParseMessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(ParseMessageError)
    }
}

/// A notification sent to clients.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    /// A full snapshot, sent after every change.
    State(GameState),

    /// The seat was taken, sent only to the new player.
    JoinSuccess {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },

    /// A new piece type awaits votes, sent only to eligible voters.
    VoteRequested {
        #[serde(rename = "proposerId")]
        proposer_id: PlayerId,
        #[serde(rename = "proposerName")]
        proposer_name: String,
        rule: PieceRule,
    },

    /// A proposal was discarded, followed by a fresh snapshot.
    VoteRejected {
        rule: PieceRule,
        reason: RejectReason,
        #[serde(rename = "disagreementCount")]
        disagreement_count: u32,
    },

    /// An informational line for the match log.
    #[serde(rename = "event")]
    Info { text: String },

    /// The match is over.
    GameEnded(Outcome),

    /// An intent was refused, sent only to its sender.
    Error { message: String },
}

impl Event {
    /// An [`Event::Info`] with the given text.
    pub fn info<T: ToString>(text: T) -> Self {
        Event::Info {
            text: text.to_string(),
        }
    }

    /// An [`Event::Error`] describing `error`.
    pub fn error<E: ToString>(error: E) -> Self {
        Event::Error {
            message: error.to_string(),
        }
    }
}

impl FromStr for Event {
    type Err = ParseMessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(ParseMessageError)
    }
}
