//! Ledger file DTOs.

use super::{amount, timestamp};
use chrono::{DateTime, Utc};
use pokerbook_core::{
    Ledger, LedgerError, Participation, Player, PlayerId, Result, Session, SessionId,
    SessionStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Player record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDTO {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Missing in some hand-edited files
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One participation; `id` is the player's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationDTO {
    pub id: String,
    #[serde(deserialize_with = "amount::deserialize")]
    pub buyin: Decimal,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub rebuys: Decimal,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub cashout: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDTO {
    pub id: String,
    pub name: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, alias = "participants")]
    pub players: Vec<ParticipationDTO>,
    /// `"active"` or `"completed"`; older files use `"current"` or omit it
    #[serde(default)]
    pub status: Option<String>,
}

/// The application's own data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerFileDTO {
    #[serde(default)]
    pub players: Vec<PlayerDTO>,
    /// Completed sessions
    #[serde(default)]
    pub sessions: Vec<SessionDTO>,
    #[serde(default)]
    pub current_session: Option<SessionDTO>,
}

/// The export/import document. Both keys are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFileDTO {
    pub players: Vec<PlayerDTO>,
    /// History plus the active session, each with its status
    pub sessions: Vec<SessionDTO>,
}

// ============================================================================
// Domain conversions
// ============================================================================

impl From<&Player> for PlayerDTO {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.to_string(),
            name: player.name.clone(),
            email: player.email.clone(),
            phone: player.phone.clone(),
            note: player.note.clone(),
            created_at: Some(player.created_at),
        }
    }
}

impl PlayerDTO {
    fn into_domain(self, loaded_at: DateTime<Utc>) -> Player {
        Player {
            id: PlayerId::from(self.id),
            name: self.name.trim().to_string(),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            note: blank_to_none(self.note),
            created_at: self.created_at.unwrap_or(loaded_at),
        }
    }
}

impl From<&Participation> for ParticipationDTO {
    fn from(p: &Participation) -> Self {
        Self {
            id: p.player_id.to_string(),
            buyin: p.buy_in,
            rebuys: p.rebuys,
            cashout: p.cash_out,
        }
    }
}

impl From<ParticipationDTO> for Participation {
    fn from(dto: ParticipationDTO) -> Self {
        Participation {
            player_id: PlayerId::from(dto.id),
            buy_in: dto.buyin,
            rebuys: dto.rebuys,
            cash_out: dto.cashout,
        }
    }
}

impl From<&Session> for SessionDTO {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            name: session.name.clone(),
            date: session.date,
            players: session.participants.iter().map(ParticipationDTO::from).collect(),
            status: Some(session.status.to_string()),
        }
    }
}

impl SessionDTO {
    /// Status as written, with legacy spellings mapped. A missing status means
    /// completed, since older builds only stamped a status on ending.
    fn parsed_status(&self) -> Result<SessionStatus> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("completed") => Ok(SessionStatus::Completed),
            Some("active") | Some("current") => Ok(SessionStatus::Active),
            Some(other) => Err(LedgerError::validation(format!(
                "session '{}' has unknown status '{other}'",
                self.id
            ))),
        }
    }

    fn into_domain(self, status: SessionStatus) -> Session {
        Session {
            id: SessionId::from(self.id),
            name: self.name.trim().to_string(),
            date: self.date,
            status,
            participants: self.players.into_iter().map(Participation::from).collect(),
        }
    }
}

impl LedgerFileDTO {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            players: ledger.players().iter().map(PlayerDTO::from).collect(),
            sessions: ledger.history().iter().map(SessionDTO::from).collect(),
            current_session: ledger.active_session().map(SessionDTO::from),
        }
    }

    /// Builds and validates a ledger from the file contents.
    pub fn into_ledger(self) -> Result<Ledger> {
        assemble(self.players, self.sessions, self.current_session)
    }
}

impl TransferFileDTO {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            players: ledger.players().iter().map(PlayerDTO::from).collect(),
            sessions: ledger.all_sessions().map(SessionDTO::from).collect(),
        }
    }

    pub fn into_ledger(self) -> Result<Ledger> {
        assemble(self.players, self.sessions, None)
    }
}

/// Sorts sessions into history and the active slot, then validates.
///
/// An entry of `sessions` with the same id as `current` is the duplicate older
/// builds wrote on save and is dropped. Any other active entry becomes the
/// active session; a second one is a conflict.
fn assemble(
    players: Vec<PlayerDTO>,
    sessions: Vec<SessionDTO>,
    current: Option<SessionDTO>,
) -> Result<Ledger> {
    let loaded_at = Utc::now();
    let players = players
        .into_iter()
        .map(|p| p.into_domain(loaded_at))
        .collect();

    let mut active = current.map(|s| s.into_domain(SessionStatus::Active));
    let mut history = Vec::with_capacity(sessions.len());

    for dto in sessions {
        if active.as_ref().is_some_and(|a| a.id.as_str() == dto.id) {
            tracing::debug!("[LedgerFile] Dropping duplicate of current session {}", dto.id);
            continue;
        }
        match dto.parsed_status()? {
            SessionStatus::Completed => history.push(dto.into_domain(SessionStatus::Completed)),
            SessionStatus::Active => {
                if let Some(existing) = &active {
                    return Err(LedgerError::conflict(format!(
                        "more than one active session ('{}' and '{}')",
                        existing.id, dto.id
                    )));
                }
                active = Some(dto.into_domain(SessionStatus::Active));
            }
        }
    }

    Ledger::from_parts(players, history, active)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
