use crate::chess::{Coord, Piece, PlayerId};
use serde::{Deserialize, Serialize};
use std::ops::Index;

const SIZE: usize = Coord::SIZE as usize;

/// The game board, a grid of cells that are either empty or hold exactly one [`Piece`].
///
/// Cells are stored row by row, i.e. `rows[y][x]`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Board {
    rows: [[Option<Piece>; SIZE]; SIZE],
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Places a piece on a cell, returning whatever was there before.
    #[inline(always)]
    pub fn set(&mut self, at: Coord, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.rows[at.y() as usize][at.x() as usize], piece)
    }

    /// Removes the piece on a cell, if any.
    #[inline(always)]
    pub fn take(&mut self, at: Coord) -> Option<Piece> {
        self.rows[at.y() as usize][at.x() as usize].take()
    }

    /// Whether there is a piece on the given cell.
    #[inline(always)]
    pub fn is_occupied(&self, at: Coord) -> bool {
        self[at].is_some()
    }

    /// An iterator over all pieces on the board.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Piece)> + '_ {
        Coord::iter().filter_map(|c| Some((c, self[c].as_ref()?)))
    }

    /// An iterator over the pieces owned by `player`.
    pub fn pieces_of<'a>(
        &'a self,
        player: &'a PlayerId,
    ) -> impl Iterator<Item = (Coord, &'a Piece)> + 'a {
        self.iter().filter(move |(_, p)| p.is_owned_by(player))
    }
}

/// Retrieves the [`Piece`] at a given [`Coord`], if any.
impl Index<Coord> for Board {
    type Output = Option<Piece>;

    #[inline(always)]
    fn index(&self, at: Coord) -> &Self::Output {
        &self.rows[at.y() as usize][at.x() as usize]
    }
}
