//! Ledger use case.
//!
//! `LedgerUseCase` is the single owner of the in-memory ledger. Presentation
//! code drives every mutation through it and hands boundary jobs a
//! [`LedgerSnapshot`] instead of a reference.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pokerbook_core::repository::LedgerRepository;
use pokerbook_core::{
    BalanceCheck, ContactDetails, Ledger, Participation, ParticipationAmounts, Player, PlayerId,
    PlayerUpdate, Session, SessionId,
};
use pokerbook_infrastructure::{export_ledger, import_ledger};
use rust_decimal::Decimal;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// Immutable copy of the ledger taken at a point in time.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    ledger: Arc<Ledger>,
    taken_at: DateTime<Utc>,
}

impl LedgerSnapshot {
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

impl Deref for LedgerSnapshot {
    type Target = Ledger;

    fn deref(&self) -> &Ledger {
        &self.ledger
    }
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub players: usize,
    pub sessions: usize,
}

pub struct LedgerUseCase {
    ledger: Ledger,
    repository: Arc<dyn LedgerRepository>,
    dirty: bool,
}

impl LedgerUseCase {
    /// Loads the stored ledger, or starts an empty one when nothing is stored.
    pub async fn load(repository: Arc<dyn LedgerRepository>) -> Result<Self> {
        let ledger = repository
            .load()
            .await
            .context("Failed to load the ledger")?;
        let ledger = match ledger {
            Some(ledger) => {
                tracing::info!(
                    "[Ledger] Loaded {} players, {} sessions",
                    ledger.players().len(),
                    ledger.all_sessions().count()
                );
                ledger
            }
            None => {
                tracing::info!("[Ledger] No saved ledger, starting empty");
                Ledger::new()
            }
        };

        Ok(Self {
            ledger,
            repository,
            dirty: false,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            ledger: Arc::new(self.ledger.clone()),
            taken_at: Utc::now(),
        }
    }

    /// Whether there are changes since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub async fn save(&mut self) -> Result<()> {
        self.repository
            .save(&self.ledger)
            .await
            .context("Failed to save the ledger")?;
        self.dirty = false;
        tracing::debug!("[Ledger] Saved");
        Ok(())
    }

    /// Writes a transfer document to `path` and saves the ledger as well.
    pub async fn export(&mut self, path: &Path) -> Result<()> {
        export_ledger(&self.ledger, path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        self.save().await
    }

    /// Replaces the whole ledger with the contents of `path`.
    ///
    /// The current ledger is untouched unless the file yields a fully valid
    /// ledger.
    pub async fn import(&mut self, path: &Path) -> Result<ImportSummary> {
        let imported = import_ledger(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        let summary = ImportSummary {
            players: imported.players().len(),
            sessions: imported.all_sessions().count(),
        };

        self.ledger = imported;
        self.dirty = true;
        tracing::info!(
            "[Ledger] Imported {} players, {} sessions",
            summary.players,
            summary.sessions
        );
        self.save().await?;
        Ok(summary)
    }

    // ============================================================================
    // Commands
    // ============================================================================

    pub fn add_player(&mut self, name: &str, details: ContactDetails) -> pokerbook_core::Result<Player> {
        let player = self.ledger.add_player(name, details)?;
        tracing::info!("[Ledger] Added player {} ({})", player.name, player.id);
        self.dirty = true;
        Ok(player)
    }

    pub fn update_player(
        &mut self,
        id: &PlayerId,
        update: PlayerUpdate,
    ) -> pokerbook_core::Result<Player> {
        let player = self.ledger.update_player(id, update)?;
        self.dirty = true;
        Ok(player)
    }

    pub fn delete_player(&mut self, id: &PlayerId) -> pokerbook_core::Result<Player> {
        let player = self.ledger.delete_player(id)?;
        tracing::info!("[Ledger] Deleted player {} ({})", player.name, player.id);
        self.dirty = true;
        Ok(player)
    }

    pub fn start_session(&mut self, name: &str) -> pokerbook_core::Result<Session> {
        let session = self.ledger.start_session(name, Utc::now())?;
        tracing::info!("[Ledger] Started session {} ({})", session.name, session.id);
        self.dirty = true;
        Ok(session)
    }

    pub fn add_participant(
        &mut self,
        session_id: &SessionId,
        player_id: &PlayerId,
        buy_in: Decimal,
    ) -> pokerbook_core::Result<Participation> {
        let participation = self.ledger.add_participant(session_id, player_id, buy_in)?;
        self.dirty = true;
        Ok(participation)
    }

    pub fn update_participant(
        &mut self,
        session_id: &SessionId,
        player_id: &PlayerId,
        amounts: ParticipationAmounts,
    ) -> pokerbook_core::Result<Participation> {
        let participation = self.ledger.update_participant(session_id, player_id, amounts)?;
        self.dirty = true;
        Ok(participation)
    }

    pub fn remove_participant(
        &mut self,
        session_id: &SessionId,
        player_id: &PlayerId,
    ) -> pokerbook_core::Result<Participation> {
        let participation = self.ledger.remove_participant(session_id, player_id)?;
        self.dirty = true;
        Ok(participation)
    }

    pub fn balance_check(&self) -> pokerbook_core::Result<BalanceCheck> {
        self.ledger.balance_check()
    }

    pub fn end_session(&mut self) -> pokerbook_core::Result<Session> {
        let session = self.ledger.end_session()?;
        tracing::info!("[Ledger] Ended session {} ({})", session.name, session.id);
        self.dirty = true;
        Ok(session)
    }

    pub fn delete_session(&mut self, id: &SessionId) -> pokerbook_core::Result<Session> {
        let session = self.ledger.delete_session(id)?;
        tracing::info!("[Ledger] Deleted session {} ({})", session.name, session.id);
        self.dirty = true;
        Ok(session)
    }
}
