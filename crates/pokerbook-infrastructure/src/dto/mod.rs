//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs describe the on-disk JSON layout of the ledger. They are private
//! to the infrastructure layer and absorb the quirks of files written by older
//! builds of the tracker:
//!
//! - amounts stored as JSON numbers instead of decimal strings
//! - timestamps without an offset (`2024-02-09T21:15:00.123456`)
//! - sessions without a `status`, or with `"current"` instead of `"active"`
//! - the current session repeated inside `sessions`
//!
//! Files are always written in the current layout: decimal strings, RFC 3339
//! timestamps and explicit statuses.

mod amount;
mod ledger;
mod timestamp;

pub use ledger::{LedgerFileDTO, ParticipationDTO, PlayerDTO, SessionDTO, TransferFileDTO};
