//! Ledger repository trait.
//!
//! Defines the interface for persisting the whole ledger as one snapshot.

use crate::error::Result;
use crate::ledger::Ledger;
use async_trait::async_trait;

/// An abstract store for the ledger.
///
/// The ledger is small and always saved whole, so the contract is a single
/// load and a single save rather than per-entity CRUD.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Loads the stored ledger.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Ledger))`: A ledger was stored and is valid
    /// - `Ok(None)`: Nothing has been stored yet
    /// - `Err(_)`: The store exists but could not be read or is invalid
    async fn load(&self) -> Result<Option<Ledger>>;

    /// Replaces the stored ledger with `ledger`.
    async fn save(&self, ledger: &Ledger) -> Result<()>;
}
