//! Player domain model.
//!
//! This module contains the Player entity and the value objects used to
//! create and edit it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, immutable player identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Generates a fresh, unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A person who takes part in home games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier, generated at creation
    pub id: PlayerId,
    /// Display name, never empty
    pub name: String,
    /// Email address, used as payee for winnings transfers
    pub email: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
    /// Set once when the player is added
    pub created_at: DateTime<Utc>,
}

/// Optional contact fields supplied when adding a player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
}

impl ContactDetails {
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A partial edit of a player.
///
/// `None` leaves a field as it is. For the optional contact fields, `Some("")`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
}

impl PlayerUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Trims a free-text field and maps blank input to `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Result of resolving a weak player reference.
///
/// Sessions keep only player ids, and a player may be deleted after the fact.
/// Lookups therefore never fail hard; they resolve to `Unknown` instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerRef<'a> {
    Known(&'a Player),
    Unknown,
}

impl<'a> PlayerRef<'a> {
    pub const UNKNOWN_NAME: &'static str = "Unknown Player";

    pub fn display_name(&self) -> &'a str {
        match self {
            PlayerRef::Known(player) => &player.name,
            PlayerRef::Unknown => Self::UNKNOWN_NAME,
        }
    }

    pub fn player(&self) -> Option<&'a Player> {
        match self {
            PlayerRef::Known(player) => Some(player),
            PlayerRef::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, PlayerRef::Known(_))
    }
}
