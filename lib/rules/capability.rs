use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Formatter};

/// The geometric pattern along which a [`Capability::Slide`] moves.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum SlidePattern {
    /// Horizontally or vertically.
    #[display(fmt = "linear")]
    Linear,
    /// Along diagonals.
    #[display(fmt = "diagonal")]
    Diagonal,
    /// Either linearly or diagonally.
    #[display(fmt = "omni")]
    Omni,
}

impl SlidePattern {
    /// Whether the displacement `(dx, dy)` lies along this pattern.
    #[inline(always)]
    pub fn matches(&self, dx: i8, dy: i8) -> bool {
        let linear = dx == 0 || dy == 0;
        let diagonal = dx.unsigned_abs() == dy.unsigned_abs();

        match self {
            SlidePattern::Linear => linear,
            SlidePattern::Diagonal => diagonal,
            SlidePattern::Omni => linear || diagonal,
        }
    }
}

/// One of the movement primitives a piece type is built from.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Capability {
    /// Movement along a pattern up to a range, optionally blocked by intervening pieces.
    Slide {
        pattern: SlidePattern,
        /// The maximum distance, `0` means unlimited.
        range: u8,
        can_jump: bool,
        only_forward: bool,
    },

    /// Movement to an exact set of relative offsets, never blocked.
    Leap {
        #[serde(alias = "possibilities")]
        #[cfg_attr(test, strategy(proptest::collection::btree_set((-7i8..=7, -7i8..=7), 1..8)))]
        offsets: BTreeSet<(i8, i8)>,
    },
}

impl Capability {
    /// An unlimited [`Capability::Slide`] that is blocked by other pieces.
    pub fn slide(pattern: SlidePattern) -> Self {
        Capability::Slide {
            pattern,
            range: 0,
            can_jump: false,
            only_forward: false,
        }
    }

    /// A [`Capability::Leap`] to the given offsets.
    pub fn leap<I: IntoIterator<Item = (i8, i8)>>(offsets: I) -> Self {
        Capability::Leap {
            offsets: offsets.into_iter().collect(),
        }
    }

    /// Whether this capability could ever reach the displacement `(dx, dy)`.
    ///
    /// The `forward` sign is `1` if forward points towards increasing `y`, `-1` otherwise.
    /// Obstruction is not considered, see [`check_move`][`crate::rules::check_move`].
    pub fn reaches(&self, dx: i8, dy: i8, forward: i8) -> bool {
        match self {
            Capability::Slide {
                pattern,
                range,
                only_forward,
                ..
            } => {
                if *only_forward && dy.signum() != forward {
                    return false;
                }

                let distance = dx.unsigned_abs().max(dy.unsigned_abs());
                if *range > 0 && distance > *range {
                    return false;
                }

                pattern.matches(dx, dy)
            }

            Capability::Leap { offsets } => offsets.contains(&(dx, dy)),
        }
    }

    /// Whether this capability is stopped by pieces standing in its way.
    pub fn is_blockable(&self) -> bool {
        matches!(self, Capability::Slide { can_jump: false, .. })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Slide {
                pattern,
                range,
                can_jump,
                only_forward,
            } => {
                write!(f, "slide {pattern}")?;

                match range {
                    0 => f.write_str(" (unlimited range)")?,
                    1 => f.write_str(" (1 square)")?,
                    r => write!(f, " ({r} squares)")?,
                }

                if *only_forward {
                    f.write_str(" [forward only]")?;
                }

                if *can_jump {
                    f.write_str(" [can jump]")?;
                }

                Ok(())
            }

            Capability::Leap { offsets } if offsets.len() == 1 => f.write_str("leap (1 pattern)"),
            Capability::Leap { offsets } => write!(f, "leap ({} patterns)", offsets.len()),
        }
    }
}
