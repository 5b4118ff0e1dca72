//! Export and import of the whole ledger.
//!
//! The transfer document is `{players, sessions}` with the active session
//! folded into `sessions`. Import builds and validates a complete ledger
//! before handing it back, so a bad file never replaces good data.

use crate::dto::TransferFileDTO;
use crate::storage::AtomicJsonFile;
use pokerbook_core::{Ledger, LedgerError, Result};
use std::path::Path;

/// Writes `ledger` to `path` as a transfer document.
pub fn export_ledger(ledger: &Ledger, path: &Path) -> Result<()> {
    let dto = TransferFileDTO::from_ledger(ledger);
    AtomicJsonFile::<TransferFileDTO>::new(path.to_path_buf()).save(&dto)?;
    tracing::info!(
        "[Transfer] Exported {} players, {} sessions to {}",
        dto.players.len(),
        dto.sessions.len(),
        path.display()
    );
    Ok(())
}

/// Reads a transfer document and builds a validated ledger from it.
///
/// # Errors
///
/// - `Validation` if the document is not an object with both `players` and
///   `sessions`, or a record is invalid
/// - `Serialization` if the file is not JSON or a record is malformed
/// - `Conflict` if the document breaks a ledger invariant
pub fn import_ledger(path: &Path) -> Result<Ledger> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let has_both_keys = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("players") && obj.contains_key("sessions"));
    if !has_both_keys {
        return Err(LedgerError::validation(
            "Invalid data format: expected both 'players' and 'sessions'",
        ));
    }

    let dto: TransferFileDTO = serde_json::from_value(value)?;
    let ledger = dto.into_ledger()?;
    tracing::info!(
        "[Transfer] Imported {} players, {} sessions from {}",
        ledger.players().len(),
        ledger.all_sessions().count(),
        path.display()
    );
    Ok(ledger)
}
