//! Player domain.

pub mod model;

pub use model::{ContactDetails, Player, PlayerId, PlayerRef, PlayerUpdate};
