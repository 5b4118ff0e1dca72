//! Session domain.

pub mod model;

pub use model::{Participation, ParticipationAmounts, Session, SessionId, SessionStatus};
