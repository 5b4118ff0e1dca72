//! Application layer for Pokerbook.
//!
//! Use cases that coordinate the domain model with the file store and the
//! remote adapters.

pub mod boundary;
pub mod ledger_usecase;
pub mod settlement_service;
pub mod sheet_sync;

pub use boundary::{BOUNDARY_TIMEOUT, Notice, NoticeLevel, spawn_boundary_job};
pub use ledger_usecase::{ImportSummary, LedgerSnapshot, LedgerUseCase};
pub use settlement_service::{SettlementService, SettlementTicket};
pub use sheet_sync::{SheetSyncService, SyncReport};
