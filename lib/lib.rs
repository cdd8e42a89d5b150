/// Board domain types.
pub mod chess;
/// Piece movement rules and their legality evaluator.
pub mod rules;
/// The state of a match and the turn coordinator.
pub mod game;
/// The rule amendment state machine.
pub mod consensus;
/// Messages exchanged between clients and the server.
pub mod protocol;
/// The authoritative, transport agnostic game server.
pub mod arbiter;
