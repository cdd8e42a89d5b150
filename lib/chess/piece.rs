use crate::chess::PlayerId;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};

/// A piece on the board.
///
/// The piece only names its type, the movement rules are looked up in the
/// [`Registry`][`crate::rules::Registry`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Constructor, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{piece_type} of {owner}")]
pub struct Piece {
    pub piece_type: String,
    pub owner: PlayerId,
}

impl Piece {
    /// Whether this piece belongs to `player`.
    #[inline(always)]
    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        &self.owner == player
    }
}
