mod setup;
mod state;

pub use setup::*;
pub use state::*;
