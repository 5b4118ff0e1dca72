//! Pokerbook domain layer.
//!
//! The ledger model, the aggregation rules derived from it, and the contracts
//! that the infrastructure and interaction crates implement. Nothing in this
//! crate performs I/O.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod ledger;
pub mod money;
pub mod player;
pub mod report;
pub mod repository;
pub mod session;
pub mod settlement;
pub mod sheet;

// Re-export common types
pub use error::{LedgerError, Result};
pub use ledger::{BalanceCheck, Ledger};
pub use player::{ContactDetails, Player, PlayerId, PlayerRef, PlayerUpdate};
pub use session::{Participation, ParticipationAmounts, Session, SessionId, SessionStatus};
