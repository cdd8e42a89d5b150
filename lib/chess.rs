mod board;
mod coord;
mod outcome;
mod piece;
mod player;

pub use board::*;
pub use coord::*;
pub use outcome::*;
pub use piece::*;
pub use player::*;
