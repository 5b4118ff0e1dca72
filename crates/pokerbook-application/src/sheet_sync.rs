//! Spreadsheet sync.
//!
//! Pushes the three report tables to a spreadsheet. Missing tabs are created,
//! headers are rewritten, and all data rows are replaced, so running the sync
//! twice leaves the same result.

use anyhow::{Context, Result};
use pokerbook_core::Ledger;
use pokerbook_core::config::AppConfig;
use pokerbook_core::report::all_tables;
use pokerbook_core::sheet::SpreadsheetBackend;
use pokerbook_interaction::GoogleSheetsBackend;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub tabs_created: Vec<String>,
    pub rows_written: usize,
}

impl SyncReport {
    pub fn summary(&self) -> String {
        if self.tabs_created.is_empty() {
            format!("Synced {} rows", self.rows_written)
        } else {
            format!(
                "Synced {} rows (created tabs: {})",
                self.rows_written,
                self.tabs_created.join(", ")
            )
        }
    }
}

pub struct SheetSyncService {
    backend: Arc<dyn SpreadsheetBackend>,
}

impl SheetSyncService {
    pub fn new(backend: Arc<dyn SpreadsheetBackend>) -> Self {
        Self { backend }
    }

    /// Connects to the Google spreadsheet named in `config`.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        if !config.sheet_sync_configured() {
            anyhow::bail!(
                "Spreadsheet sync is not configured; set google_sheet_name and google_credentials_file"
            );
        }
        let backend = GoogleSheetsBackend::connect(config)
            .await
            .context("Failed to connect to Google Sheets")?;
        Ok(Self::new(Arc::new(backend)))
    }

    pub async fn sync(&self, ledger: &Ledger) -> Result<SyncReport> {
        let existing: HashSet<String> = self
            .backend
            .list_tabs()
            .await
            .context("Failed to list spreadsheet tabs")?
            .into_iter()
            .collect();

        let mut report = SyncReport::default();
        for table in all_tables(ledger) {
            if !existing.contains(&table.name) {
                tracing::info!("[SheetSync] Creating tab '{}'", table.name);
                self.backend
                    .create_tab(&table.name)
                    .await
                    .with_context(|| format!("Failed to create tab '{}'", table.name))?;
                report.tabs_created.push(table.name.clone());
            }

            self.backend
                .write_header(&table.name, &table.headers)
                .await
                .with_context(|| format!("Failed to write header of '{}'", table.name))?;
            self.backend
                .replace_rows(&table.name, &table.rows)
                .await
                .with_context(|| format!("Failed to write rows of '{}'", table.name))?;
            report.rows_written += table.rows.len();
        }

        tracing::info!("[SheetSync] {}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pokerbook_core::report::{PLAYERS_TAB, SESSION_DETAILS_TAB, SESSIONS_TAB};
    use pokerbook_core::{ContactDetails, LedgerError};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySheet {
        tabs: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
        fail_writes: bool,
    }

    impl MemorySheet {
        fn with_tab(name: &str) -> Self {
            let sheet = Self::default();
            sheet.tabs.lock().unwrap().insert(name.to_string(), Vec::new());
            sheet
        }

        fn tab(&self, name: &str) -> Vec<Vec<String>> {
            self.tabs.lock().unwrap().get(name).cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl SpreadsheetBackend for MemorySheet {
        async fn list_tabs(&self) -> pokerbook_core::Result<Vec<String>> {
            Ok(self.tabs.lock().unwrap().keys().cloned().collect())
        }

        async fn create_tab(&self, title: &str) -> pokerbook_core::Result<()> {
            self.tabs.lock().unwrap().insert(title.to_string(), Vec::new());
            Ok(())
        }

        async fn write_header(&self, tab: &str, headers: &[String]) -> pokerbook_core::Result<()> {
            if self.fail_writes {
                return Err(LedgerError::external("Google Sheets", "HTTP 403"));
            }
            let mut tabs = self.tabs.lock().unwrap();
            let rows = tabs.entry(tab.to_string()).or_default();
            if rows.is_empty() {
                rows.push(headers.to_vec());
            } else {
                rows[0] = headers.to_vec();
            }
            Ok(())
        }

        async fn replace_rows(&self, tab: &str, rows: &[Vec<String>]) -> pokerbook_core::Result<()> {
            let mut tabs = self.tabs.lock().unwrap();
            let existing = tabs.entry(tab.to_string()).or_default();
            existing.truncate(1);
            existing.extend(rows.iter().cloned());
            Ok(())
        }
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let alice = ledger.add_player("Alice", ContactDetails::default()).unwrap();
        let bob = ledger.add_player("Bob", ContactDetails::default()).unwrap();
        let session = ledger.start_session("Friday", Utc::now()).unwrap();
        ledger.add_participant(&session.id, &alice.id, dec!(20)).unwrap();
        ledger.add_participant(&session.id, &bob.id, dec!(20)).unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_sync_creates_missing_tabs() {
        let sheet = Arc::new(MemorySheet::with_tab(PLAYERS_TAB));
        let service = SheetSyncService::new(sheet.clone());

        let report = service.sync(&sample_ledger()).await.unwrap();
        assert_eq!(report.tabs_created, vec![SESSIONS_TAB, SESSION_DETAILS_TAB]);
        // 2 players + 1 session + 2 participations
        assert_eq!(report.rows_written, 5);

        let players = sheet.tab(PLAYERS_TAB);
        assert_eq!(players[0][1], "Name");
        assert_eq!(players.len(), 3);
    }

    #[tokio::test]
    async fn test_sync_twice_replaces_rows() {
        let sheet = Arc::new(MemorySheet::default());
        let service = SheetSyncService::new(sheet.clone());
        let ledger = sample_ledger();

        service.sync(&ledger).await.unwrap();
        let second = service.sync(&ledger).await.unwrap();

        assert!(second.tabs_created.is_empty());
        assert_eq!(sheet.tab(SESSION_DETAILS_TAB).len(), 3);
    }

    #[tokio::test]
    async fn test_backend_error_is_reported() {
        let sheet = Arc::new(MemorySheet {
            fail_writes: true,
            ..MemorySheet::default()
        });
        let err = SheetSyncService::new(sheet).sync(&sample_ledger()).await.unwrap_err();
        assert!(format!("{err:#}").contains("HTTP 403"));
    }

    #[tokio::test]
    async fn test_connect_requires_configuration() {
        assert!(SheetSyncService::connect(&AppConfig::default()).await.is_err());
    }

    #[test]
    fn test_summary_mentions_created_tabs() {
        let report = SyncReport {
            tabs_created: vec!["Players".to_string()],
            rows_written: 4,
        };
        assert_eq!(report.summary(), "Synced 4 rows (created tabs: Players)");
    }
}
