use crate::rules::{is_displacement_allowed, Capability};
use std::fmt::{self, Formatter, Write};

/// The displacements a set of capabilities reaches on an empty grid centred on the piece.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Preview<'a> {
    capabilities: &'a [Capability],
    radius: u8,
    forward: i8,
}

impl<'a> Preview<'a> {
    /// Previews `capabilities` on a grid of `2 * radius + 1` cells per side.
    pub fn new(capabilities: &'a [Capability], radius: u8, forward: i8) -> Self {
        Preview {
            capabilities,
            radius,
            forward,
        }
    }

    fn span(&self) -> impl DoubleEndedIterator<Item = i8> + Clone {
        let r = self.radius.min(i8::MAX as u8) as i8;
        -r..=r
    }

    /// The reachable displacements, row by row.
    pub fn reachable(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.span()
            .flat_map(move |dy| self.span().map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| is_displacement_allowed(dx, dy, self.capabilities, self.forward))
    }
}

/// Draws the grid with forward pointing up.
///
/// The piece is drawn as `@`, reachable cells as `*` and everything else as `.`.
impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for dy in self.span().rev() {
            for dx in self.span() {
                let dy = dy * self.forward.signum();
                let c = if (dx, dy) == (0, 0) {
                    '@'
                } else if is_displacement_allowed(dx, dy, self.capabilities, self.forward) {
                    '*'
                } else {
                    '.'
                };

                f.write_char(c)?;
            }

            f.write_char('\n')?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Registry, SlidePattern};
    use test_strategy::proptest;

    #[test]
    fn knight_reaches_eight_cells() {
        let rules = Registry::standard();
        let knight = &rules.get("Knight").unwrap().capabilities;
        assert_eq!(Preview::new(knight, 3, 1).reachable().count(), 8);
    }

    #[proptest]
    fn preview_never_includes_the_piece_itself(
        #[strategy(proptest::collection::vec(proptest::prelude::any::<Capability>(), 0..4))]
        capabilities: Vec<Capability>,
        #[strategy(0u8..8)] radius: u8,
    ) {
        let preview = Preview::new(&capabilities, radius, 1);
        assert!(preview.reachable().all(|d| d != (0, 0)));
    }

    #[test]
    fn pawn_preview_points_forward() {
        let rules = Registry::standard();
        let pawn = &rules.get("Pawn").unwrap().capabilities;
        assert_eq!(Preview::new(pawn, 1, 1).to_string(), ".*.\n.@.\n...\n");
        assert_eq!(Preview::new(pawn, 1, -1).to_string(), ".*.\n.@.\n...\n");
    }

    #[test]
    fn rook_preview_draws_a_cross() {
        let rook = [Capability::slide(SlidePattern::Linear)];
        assert_eq!(
            Preview::new(&rook, 2, 1).to_string(),
            "..*..\n..*..\n**@**\n..*..\n..*..\n"
        );
    }
}
