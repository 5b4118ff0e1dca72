//! Session domain model.
//!
//! A session is one home game: a name, a date, and the participation record of
//! every player who sat down. Amounts are exact decimals so that the balance of
//! a session is free of floating point noise.

use crate::player::PlayerId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque session identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The single in-progress session.
    Active,
    /// Finished and stored in history. Never reactivated.
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => f.write_str("active"),
            SessionStatus::Completed => f.write_str("completed"),
        }
    }
}

/// One player's money movements within one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    /// Weak reference to a player; the player may have been deleted since.
    pub player_id: PlayerId,
    pub buy_in: Decimal,
    pub rebuys: Decimal,
    pub cash_out: Decimal,
}

impl Participation {
    /// A fresh participation: rebuys and cash-out start at zero.
    pub fn new(player_id: PlayerId, buy_in: Decimal) -> Self {
        Self {
            player_id,
            buy_in,
            rebuys: Decimal::ZERO,
            cash_out: Decimal::ZERO,
        }
    }

    /// Everything the player put in: `buy_in + rebuys`.
    pub fn total_in(&self) -> Decimal {
        self.buy_in + self.rebuys
    }

    /// `cash_out - total_in`. Negative means the player lost money.
    pub fn profit(&self) -> Decimal {
        self.cash_out - self.total_in()
    }
}

/// Edited amounts for an existing participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipationAmounts {
    pub buy_in: Decimal,
    pub rebuys: Decimal,
    pub cash_out: Decimal,
}

impl ParticipationAmounts {
    pub fn new(buy_in: Decimal, rebuys: Decimal, cash_out: Decimal) -> Self {
        Self {
            buy_in,
            rebuys,
            cash_out,
        }
    }
}

/// A home-game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    /// Set when the session starts and never recomputed
    pub date: DateTime<Utc>,
    pub status: SessionStatus,
    /// Insertion order is kept for display
    pub participants: Vec<Participation>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn participant(&self, player_id: &PlayerId) -> Option<&Participation> {
        self.participants.iter().find(|p| &p.player_id == player_id)
    }

    pub(crate) fn participant_mut(&mut self, player_id: &PlayerId) -> Option<&mut Participation> {
        self.participants
            .iter_mut()
            .find(|p| &p.player_id == player_id)
    }

    pub fn has_participant(&self, player_id: &PlayerId) -> bool {
        self.participant(player_id).is_some()
    }

    /// Calendar day of the session, as used in reports and payment notes.
    pub fn day(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_participation_derived_values() {
        let mut p = Participation::new(PlayerId::from("alice"), dec!(10));
        p.rebuys = dec!(5);
        p.cash_out = dec!(20);
        assert_eq!(p.total_in(), dec!(15));
        assert_eq!(p.profit(), dec!(5));
    }

    #[test]
    fn test_new_participation_defaults_to_zero() {
        let p = Participation::new(PlayerId::from("bob"), dec!(10));
        assert_eq!(p.rebuys, Decimal::ZERO);
        assert_eq!(p.cash_out, Decimal::ZERO);
        assert_eq!(p.profit(), dec!(-10));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Active.to_string(), "active");
        assert_eq!(SessionStatus::Completed.to_string(), "completed");
    }
}
