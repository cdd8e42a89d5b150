use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Sub};

/// The reason why a pair of coordinates does not address a cell of the [`Board`][`crate::chess::Board`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Error)]
#[display(fmt = "({x}, {y}) is outside of the board")]
pub struct OutOfBounds {
    pub x: u8,
    pub y: u8,
}

/// A cell on the board.
///
/// This type guarantees that both coordinates are smaller than [`Coord::SIZE`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Coord {
    #[cfg_attr(test, strategy(0..Coord::SIZE))]
    x: u8,
    #[cfg_attr(test, strategy(0..Coord::SIZE))]
    y: u8,
}

impl Coord {
    /// The number of cells along each side of the board.
    pub const SIZE: u8 = 8;

    /// Constructs [`Coord`] if both coordinates are on the board.
    #[inline(always)]
    pub fn new(x: u8, y: u8) -> Result<Self, OutOfBounds> {
        if x < Self::SIZE && y < Self::SIZE {
            Ok(Coord { x, y })
        } else {
            Err(OutOfBounds { x, y })
        }
    }

    /// The horizontal coordinate.
    #[inline(always)]
    pub fn x(&self) -> u8 {
        self.x
    }

    /// The vertical coordinate.
    #[inline(always)]
    pub fn y(&self) -> u8 {
        self.y
    }

    /// The cell displaced by `(dx, dy)`, if it is on the board.
    #[inline(always)]
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Self> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Coord::new(x, y).ok()
    }

    /// The cells strictly between `self` and `to` along a straight or diagonal line.
    ///
    /// Yields nothing if the two cells are not aligned.
    pub fn between(self, to: Coord) -> impl Iterator<Item = Coord> {
        let (dx, dy) = to - self;
        let aligned = dx == 0 || dy == 0 || dx.unsigned_abs() == dy.unsigned_abs();
        let steps = if aligned {
            dx.unsigned_abs().max(dy.unsigned_abs())
        } else {
            0
        };

        let (sx, sy) = (dx.signum(), dy.signum());
        (1..steps).filter_map(move |k| self.offset(sx * k as i8, sy * k as i8))
    }

    /// An iterator over all cells, row by row.
    pub fn iter() -> impl DoubleEndedIterator<Item = Coord> {
        (0..Self::SIZE).flat_map(|y| (0..Self::SIZE).map(move |x| Coord { x, y }))
    }
}

impl TryFrom<(u8, u8)> for Coord {
    type Error = OutOfBounds;

    fn try_from((x, y): (u8, u8)) -> Result<Self, Self::Error> {
        Coord::new(x, y)
    }
}

impl From<Coord> for (u8, u8) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

/// The displacement `(dx, dy)` that takes `rhs` to `self`.
impl Sub for Coord {
    type Output = (i8, i8);

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        (
            self.x as i8 - rhs.x as i8,
            self.y as i8 - rhs.y as i8,
        )
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
