//! Pokerbook infrastructure layer.
//!
//! File-backed implementations of the core contracts: the JSON ledger store,
//! export/import, configuration loading and platform paths.

pub mod config_service;
pub mod dto;
pub mod json_ledger_repository;
pub mod paths;
pub mod storage;
pub mod transfer;

pub use config_service::ConfigService;
pub use json_ledger_repository::JsonLedgerRepository;
pub use paths::PokerbookPaths;
pub use transfer::{export_ledger, import_ledger};
