use crate::chess::{Board, Coord, Piece, PlayerId};

const BACK_RANK: [&str; Coord::SIZE as usize] = [
    "Rook", "Knight", "Bishop", "Queen", "King", "Bishop", "Knight", "Rook",
];

/// The standard opening arrangement.
///
/// The `south` player occupies the two lowest rows and the `north` player the two highest.
pub fn standard_setup(south: &PlayerId, north: &PlayerId) -> Board {
    let mut board = Board::empty();
    let last = Coord::SIZE - 1;

    for (x, kind) in (0..).zip(BACK_RANK) {
        for (y, kind, owner) in [
            (0, kind, south),
            (1, "Pawn", south),
            (last - 1, "Pawn", north),
            (last, kind, north),
        ] {
            if let Ok(at) = Coord::new(x, y) {
                board.set(at, Some(Piece::new(kind.to_string(), owner.clone())));
            }
        }
    }

    board
}
