use crate::chess::{Board, Coord, PlayerId};
use crate::rules::{Capability, Registry, UnknownPieceType};
use derive_more::{Display, Error};

/// The reason why a move is illegal on a given [`Board`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum IllegalMove {
    #[display(fmt = "there is no piece on {_0}")]
    EmptySource(#[error(not(source))] Coord),

    #[display(fmt = "the piece on {_0} belongs to the opponent")]
    NotYourPiece(#[error(not(source))] Coord),

    #[display(fmt = "cannot capture your own piece on {_0}")]
    OwnCapture(#[error(not(source))] Coord),

    #[display(fmt = "{_0}")]
    UnknownPieceType(UnknownPieceType),

    #[display(fmt = "the piece on {from} cannot move to {to}")]
    Unreachable { from: Coord, to: Coord },

    #[display(fmt = "the path from {from} to {to} is blocked")]
    Blocked { from: Coord, to: Coord },
}

/// Whether any of the capabilities could ever reach the displacement `(dx, dy)`.
///
/// The `forward` sign is `1` if forward points towards increasing `y`, `-1` otherwise.
/// This ignores other pieces, which makes it suitable for previewing moves on an empty board.
pub fn is_displacement_allowed(dx: i8, dy: i8, capabilities: &[Capability], forward: i8) -> bool {
    (dx, dy) != (0, 0) && capabilities.iter().any(|c| c.reaches(dx, dy, forward))
}

/// Checks whether `player` may move the piece on `from` to `to`.
///
/// A capability authorizes the move if it reaches the displacement and, unless it
/// can jump, every cell strictly between `from` and `to` is empty.
///
/// Pawns are special: they capture one cell diagonally forward and never capture straight ahead.
pub fn check_move(
    board: &Board,
    from: Coord,
    to: Coord,
    rules: &Registry,
    player: &PlayerId,
    forward: i8,
) -> Result<(), IllegalMove> {
    let piece = board[from].as_ref().ok_or(IllegalMove::EmptySource(from))?;

    if !piece.is_owned_by(player) {
        return Err(IllegalMove::NotYourPiece(from));
    }

    let capture = match &board[to] {
        Some(p) if p.is_owned_by(player) => return Err(IllegalMove::OwnCapture(to)),
        Some(_) => true,
        None => false,
    };

    let rule = rules
        .get(&piece.piece_type)
        .map_err(IllegalMove::UnknownPieceType)?;
    let (dx, dy) = to - from;

    if piece.piece_type == Registry::PAWN && capture {
        return if dx.abs() == 1 && dy == forward {
            Ok(())
        } else {
            Err(IllegalMove::Unreachable { from, to })
        };
    }

    if !is_displacement_allowed(dx, dy, &rule.capabilities, forward) {
        return Err(IllegalMove::Unreachable { from, to });
    }

    let clear = || from.between(to).all(|c| !board.is_occupied(c));
    let mut authorizing = rule.capabilities.iter().filter(|c| c.reaches(dx, dy, forward));
    if authorizing.any(|c| !c.is_blockable() || clear()) {
        Ok(())
    } else {
        Err(IllegalMove::Blocked { from, to })
    }
}

/// Whether `player` may move the piece on `from` to `to`, see [`check_move`].
pub fn is_move_legal(
    board: &Board,
    from: Coord,
    to: Coord,
    rules: &Registry,
    player: &PlayerId,
    forward: i8,
) -> bool {
    check_move(board, from, to, rules, player, forward).is_ok()
}
