mod capability;
mod legality;
mod preview;
mod registry;
mod rule;

pub use capability::*;
pub use legality::*;
pub use preview::*;
pub use registry::*;
pub use rule::*;
