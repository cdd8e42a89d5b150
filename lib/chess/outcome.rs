use crate::chess::PlayerId;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One of the possible outcomes of a match.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// The losing side has no royal piece left.
    #[display(fmt = "{winner} eliminated every royal piece of the opponent")]
    RoyalElimination { winner: PlayerId },

    /// Too many rule proposals were rejected.
    #[display(fmt = "doomsday, too many rule proposals were rejected")]
    Doomsday,
}

impl Outcome {
    /// Whether the outcome is a draw and neither side has won.
    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }

    /// The winning side, if any.
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            Outcome::RoyalElimination { winner } => Some(winner),
            Outcome::Doomsday => None,
        }
    }
}
