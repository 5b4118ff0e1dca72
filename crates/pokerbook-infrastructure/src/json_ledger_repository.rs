//! JSON file-based LedgerRepository implementation.

use crate::dto::LedgerFileDTO;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use pokerbook_core::repository::LedgerRepository;
use pokerbook_core::{Ledger, LedgerError, Result};
use std::path::{Path, PathBuf};

/// Stores the ledger in a single JSON file.
///
/// File I/O runs on the blocking pool so the REPL's runtime is never stalled
/// by a slow disk.
pub struct JsonLedgerRepository {
    path: PathBuf,
}

impl JsonLedgerRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LedgerRepository for JsonLedgerRepository {
    async fn load(&self) -> Result<Option<Ledger>> {
        let file = AtomicJsonFile::<LedgerFileDTO>::new(self.path.clone());
        let dto = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| LedgerError::io(format!("load task failed: {e}")))??;

        match dto {
            Some(dto) => {
                let ledger = dto.into_ledger()?;
                tracing::info!(
                    "[LedgerFile] Loaded {} players, {} sessions from {}",
                    ledger.players().len(),
                    ledger.history().len(),
                    self.path.display()
                );
                Ok(Some(ledger))
            }
            None => {
                tracing::info!("[LedgerFile] No ledger at {}", self.path.display());
                Ok(None)
            }
        }
    }

    async fn save(&self, ledger: &Ledger) -> Result<()> {
        let dto = LedgerFileDTO::from_ledger(ledger);
        let file = AtomicJsonFile::<LedgerFileDTO>::new(self.path.clone());

        tokio::task::spawn_blocking(move || file.replace(&dto))
            .await
            .map_err(|e| LedgerError::io(format!("save task failed: {e}")))??;

        tracing::debug!("[LedgerFile] Saved ledger to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pokerbook_core::{ContactDetails, PlayerRef};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonLedgerRepository::new(temp_dir.path().join("poker_data.json"));
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_restores_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonLedgerRepository::new(temp_dir.path().join("poker_data.json"));

        let mut ledger = Ledger::new();
        let alice = ledger.add_player("Alice", ContactDetails::default()).unwrap().id;
        let session = ledger.start_session("Friday", Utc::now()).unwrap();
        ledger.add_participant(&session.id, &alice, dec!(20)).unwrap();
        ledger.end_session().unwrap();
        ledger.delete_player(&alice).unwrap();

        repo.save(&ledger).await.unwrap();
        let loaded = repo.load().await.unwrap().unwrap();

        assert_eq!(loaded, ledger);
        assert_eq!(loaded.resolve_player(&alice), PlayerRef::Unknown);
    }

    #[tokio::test]
    async fn test_file_layout_keeps_current_session_separate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("poker_data.json");
        let repo = JsonLedgerRepository::new(path.clone());

        let mut ledger = Ledger::new();
        ledger.start_session("Done", Utc::now()).unwrap();
        ledger.end_session().unwrap();
        ledger.start_session("Live", Utc::now()).unwrap();
        repo.save(&ledger).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["sessions"].as_array().unwrap().len(), 1);
        assert_eq!(raw["sessions"][0]["status"], "completed");
        assert_eq!(raw["current_session"]["name"], "Live");
        assert_eq!(raw["current_session"]["status"], "active");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("poker_data.json");
        std::fs::write(&path, "{\"players\": [").unwrap();

        let err = JsonLedgerRepository::new(path).load().await.unwrap_err();
        assert!(err.is_serialization());
    }
}
