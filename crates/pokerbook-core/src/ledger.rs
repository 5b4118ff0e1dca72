//! The ledger aggregate root.
//!
//! `Ledger` owns the player set, the completed-session history and the single
//! active-session slot. Every command validates fully before it mutates
//! anything, so a failed command leaves the ledger exactly as it was.

use crate::aggregation::{SessionTotals, session_totals};
use crate::error::{LedgerError, Result};
use crate::money::{MAX_AMOUNT, format_amount};
use crate::player::model::normalize_optional;
use crate::player::{ContactDetails, Player, PlayerId, PlayerRef, PlayerUpdate};
use crate::session::{
    Participation, ParticipationAmounts, Session, SessionId, SessionStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Outcome of checking the active session before it is ended.
///
/// The ledger itself always ends a session when asked to. Whether an
/// unbalanced session needs the user's confirmation first is a decision the
/// presentation layer makes from `needs_confirmation`.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceCheck {
    pub session_id: SessionId,
    pub totals: SessionTotals,
    pub needs_confirmation: bool,
}

/// In-memory ledger of players and sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    players: Vec<Player>,
    history: Vec<Session>,
    active: Option<Session>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted parts, checking every invariant.
    ///
    /// # Errors
    ///
    /// - `Conflict` if ids repeat, a history entry is still active, the active
    ///   slot holds a completed session, or a player appears twice in a session
    /// - `Validation` if a name is empty or an amount is out of range
    pub fn from_parts(
        players: Vec<Player>,
        history: Vec<Session>,
        active: Option<Session>,
    ) -> Result<Self> {
        let mut player_ids = HashSet::new();
        for player in &players {
            if player.name.trim().is_empty() {
                return Err(LedgerError::validation(format!(
                    "player '{}' has an empty name",
                    player.id
                )));
            }
            if !player_ids.insert(&player.id) {
                return Err(LedgerError::conflict(format!(
                    "duplicate player id '{}'",
                    player.id
                )));
            }
        }

        let mut session_ids = HashSet::new();
        for session in history.iter().chain(active.iter()) {
            if !session_ids.insert(&session.id) {
                return Err(LedgerError::conflict(format!(
                    "duplicate session id '{}'",
                    session.id
                )));
            }
            Self::check_session(session)?;
        }

        if let Some(session) = history.iter().find(|s| s.is_active()) {
            return Err(LedgerError::conflict(format!(
                "session '{}' in history is still active",
                session.id
            )));
        }
        if let Some(session) = active.as_ref().filter(|s| !s.is_active()) {
            return Err(LedgerError::conflict(format!(
                "session '{}' in the active slot is already completed",
                session.id
            )));
        }

        Ok(Self {
            players,
            history,
            active,
        })
    }

    fn check_session(session: &Session) -> Result<()> {
        if session.name.trim().is_empty() {
            return Err(LedgerError::validation(format!(
                "session '{}' has an empty name",
                session.id
            )));
        }
        let mut seen = HashSet::new();
        for p in &session.participants {
            if !seen.insert(&p.player_id) {
                return Err(LedgerError::conflict(format!(
                    "player '{}' appears twice in session '{}'",
                    p.player_id, session.id
                )));
            }
            check_amounts(&ParticipationAmounts::new(p.buy_in, p.rebuys, p.cash_out))?;
        }
        Ok(())
    }

    // ============================================================================
    // Read access
    // ============================================================================

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Resolves a weak player reference, yielding `PlayerRef::Unknown` for
    /// players that have been deleted.
    pub fn resolve_player(&self, id: &PlayerId) -> PlayerRef<'_> {
        match self.player(id) {
            Some(player) => PlayerRef::Known(player),
            None => PlayerRef::Unknown,
        }
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    /// Completed sessions, oldest first.
    pub fn history(&self) -> &[Session] {
        &self.history
    }

    /// Looks a session up in history and the active slot.
    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.all_sessions().find(|s| &s.id == id)
    }

    /// History followed by the active session, if any. Every report runs over
    /// this sequence.
    pub fn all_sessions(&self) -> impl Iterator<Item = &Session> + Clone + '_ {
        self.history.iter().chain(self.active.iter())
    }

    /// Decomposes the ledger into its persisted parts.
    pub fn into_parts(self) -> (Vec<Player>, Vec<Session>, Option<Session>) {
        (self.players, self.history, self.active)
    }

    // ============================================================================
    // Player commands
    // ============================================================================

    /// Adds a new player with a freshly generated id.
    pub fn add_player(&mut self, name: &str, details: ContactDetails) -> Result<Player> {
        let name = require_name(name, "player name")?;
        let player = Player {
            id: PlayerId::generate(),
            name,
            email: normalize_optional(details.email),
            phone: normalize_optional(details.phone),
            note: normalize_optional(details.note),
            created_at: Utc::now(),
        };
        self.players.push(player.clone());
        Ok(player)
    }

    /// Edits a player's name and contact details.
    pub fn update_player(&mut self, id: &PlayerId, update: PlayerUpdate) -> Result<Player> {
        let new_name = update
            .name
            .as_deref()
            .map(|name| require_name(name, "player name"))
            .transpose()?;

        let player = self
            .players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| LedgerError::not_found("player", id.as_str()))?;

        if let Some(name) = new_name {
            player.name = name;
        }
        if update.email.is_some() {
            player.email = normalize_optional(update.email);
        }
        if update.phone.is_some() {
            player.phone = normalize_optional(update.phone);
        }
        if update.note.is_some() {
            player.note = normalize_optional(update.note);
        }
        Ok(player.clone())
    }

    /// Removes a player from the player set.
    ///
    /// Participation records in any session keep the now-dangling id.
    pub fn delete_player(&mut self, id: &PlayerId) -> Result<Player> {
        let index = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| LedgerError::not_found("player", id.as_str()))?;
        Ok(self.players.remove(index))
    }

    // ============================================================================
    // Session commands
    // ============================================================================

    /// Starts a new active session.
    pub fn start_session(&mut self, name: &str, date: DateTime<Utc>) -> Result<Session> {
        if let Some(active) = &self.active {
            return Err(LedgerError::conflict(format!(
                "session '{}' is already active; end it before starting a new one",
                active.name
            )));
        }
        let name = require_name(name, "session name")?;

        let session = Session {
            id: SessionId::generate(),
            name,
            date,
            status: SessionStatus::Active,
            participants: Vec::new(),
        };
        self.active = Some(session.clone());
        Ok(session)
    }

    /// Seats a player in the active session with an initial buy-in.
    pub fn add_participant(
        &mut self,
        session_id: &SessionId,
        player_id: &PlayerId,
        buy_in: Decimal,
    ) -> Result<Participation> {
        if buy_in <= Decimal::ZERO {
            return Err(LedgerError::validation("buy-in must be greater than 0"));
        }
        check_amounts(&ParticipationAmounts::new(buy_in, Decimal::ZERO, Decimal::ZERO))?;
        if self.player(player_id).is_none() {
            return Err(LedgerError::not_found("player", player_id.as_str()));
        }

        let session = self.active_mut(session_id)?;
        if session.has_participant(player_id) {
            return Err(LedgerError::conflict(format!(
                "player '{}' is already in session '{}'",
                player_id, session.name
            )));
        }

        let participation = Participation::new(player_id.clone(), buy_in);
        session.participants.push(participation.clone());
        Ok(participation)
    }

    /// Replaces the amounts of a participation in the active session.
    pub fn update_participant(
        &mut self,
        session_id: &SessionId,
        player_id: &PlayerId,
        amounts: ParticipationAmounts,
    ) -> Result<Participation> {
        check_amounts(&amounts)?;

        let session = self.active_mut(session_id)?;
        let participation = session
            .participant_mut(player_id)
            .ok_or_else(|| LedgerError::not_found("participant", player_id.as_str()))?;

        participation.buy_in = amounts.buy_in;
        participation.rebuys = amounts.rebuys;
        participation.cash_out = amounts.cash_out;
        Ok(participation.clone())
    }

    /// Removes a participation from the active session.
    pub fn remove_participant(
        &mut self,
        session_id: &SessionId,
        player_id: &PlayerId,
    ) -> Result<Participation> {
        let session = self.active_mut(session_id)?;
        let index = session
            .participants
            .iter()
            .position(|p| &p.player_id == player_id)
            .ok_or_else(|| LedgerError::not_found("participant", player_id.as_str()))?;
        Ok(session.participants.remove(index))
    }

    /// Computes the totals of the active session and whether ending it needs
    /// confirmation.
    pub fn balance_check(&self) -> Result<BalanceCheck> {
        let session = self
            .active
            .as_ref()
            .ok_or_else(|| LedgerError::conflict("there is no active session"))?;
        let totals = session_totals(session);
        Ok(BalanceCheck {
            session_id: session.id.clone(),
            totals,
            needs_confirmation: !totals.is_balanced(),
        })
    }

    /// Moves the active session into history as completed.
    ///
    /// This always succeeds when a session is active, balanced or not.
    pub fn end_session(&mut self) -> Result<Session> {
        let mut session = self
            .active
            .take()
            .ok_or_else(|| LedgerError::conflict("there is no active session to end"))?;
        session.status = SessionStatus::Completed;
        self.history.push(session.clone());
        Ok(session)
    }

    /// Permanently removes a completed session from history.
    pub fn delete_session(&mut self, id: &SessionId) -> Result<Session> {
        if self.active.as_ref().is_some_and(|s| &s.id == id) {
            return Err(LedgerError::conflict(
                "the active session cannot be deleted; end it first",
            ));
        }
        let index = self
            .history
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| LedgerError::not_found("session", id.as_str()))?;
        Ok(self.history.remove(index))
    }

    fn active_mut(&mut self, session_id: &SessionId) -> Result<&mut Session> {
        self.active
            .as_mut()
            .filter(|s| &s.id == session_id)
            .ok_or_else(|| LedgerError::not_found("active session", session_id.as_str()))
    }
}

fn require_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(format!("{what} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn check_amounts(amounts: &ParticipationAmounts) -> Result<()> {
    for (label, value) in [
        ("buy-in", amounts.buy_in),
        ("rebuys", amounts.rebuys),
        ("cash-out", amounts.cash_out),
    ] {
        if value < Decimal::ZERO {
            return Err(LedgerError::validation(format!("{label} cannot be negative")));
        }
        if value > MAX_AMOUNT {
            return Err(LedgerError::validation(format!(
                "{label} cannot exceed {}",
                format_amount(MAX_AMOUNT)
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::player_totals;
    use rust_decimal_macros::dec;

    fn ledger_with_players(names: &[&str]) -> (Ledger, Vec<PlayerId>) {
        let mut ledger = Ledger::new();
        let ids = names
            .iter()
            .map(|name| {
                ledger
                    .add_player(name, ContactDetails::default())
                    .unwrap()
                    .id
            })
            .collect();
        (ledger, ids)
    }

    /// Alice (10 + 5 rebuys, cashes 20) and Bob (10, cashes 5), still active.
    fn alice_bob_session() -> (Ledger, SessionId, PlayerId, PlayerId) {
        let (mut ledger, ids) = ledger_with_players(&["Alice", "Bob"]);
        let (alice, bob) = (ids[0].clone(), ids[1].clone());
        let session = ledger.start_session("Friday game", Utc::now()).unwrap();

        ledger.add_participant(&session.id, &alice, dec!(10)).unwrap();
        ledger.add_participant(&session.id, &bob, dec!(10)).unwrap();
        ledger
            .update_participant(
                &session.id,
                &alice,
                ParticipationAmounts::new(dec!(10), dec!(5), dec!(20)),
            )
            .unwrap();
        ledger
            .update_participant(
                &session.id,
                &bob,
                ParticipationAmounts::new(dec!(10), dec!(0), dec!(5)),
            )
            .unwrap();
        (ledger, session.id, alice, bob)
    }

    #[test]
    fn test_add_player_trims_and_normalizes() {
        let mut ledger = Ledger::new();
        let player = ledger
            .add_player(
                "  Alice ",
                ContactDetails::default().with_email(" alice@example.com ").with_phone("  "),
            )
            .unwrap();
        assert_eq!(player.name, "Alice");
        assert_eq!(player.email.as_deref(), Some("alice@example.com"));
        assert_eq!(player.phone, None);
        assert_eq!(ledger.players().len(), 1);
    }

    #[test]
    fn test_add_player_rejects_blank_name() {
        let mut ledger = Ledger::new();
        let err = ledger.add_player("   ", ContactDetails::default()).unwrap_err();
        assert!(err.is_validation());
        assert!(ledger.players().is_empty());
    }

    #[test]
    fn test_update_player() {
        let (mut ledger, ids) = ledger_with_players(&["Alice"]);
        let updated = ledger
            .update_player(&ids[0], PlayerUpdate::rename("Alicia"))
            .unwrap();
        assert_eq!(updated.name, "Alicia");

        let err = ledger
            .update_player(&ids[0], PlayerUpdate::rename(" "))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ledger.players()[0].name, "Alicia");

        let err = ledger
            .update_player(&PlayerId::from("nope"), PlayerUpdate::rename("X"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_player_clears_email_with_empty_string() {
        let mut ledger = Ledger::new();
        let id = ledger
            .add_player("Alice", ContactDetails::default().with_email("a@b.c"))
            .unwrap()
            .id;
        let update = PlayerUpdate {
            email: Some(String::new()),
            ..PlayerUpdate::default()
        };
        let player = ledger.update_player(&id, update).unwrap();
        assert_eq!(player.email, None);
        assert_eq!(player.name, "Alice");
    }

    #[test]
    fn test_start_session_conflicts_while_active() {
        let (mut ledger, _) = ledger_with_players(&["Alice"]);
        for i in 0..3 {
            ledger.start_session(&format!("Game {i}"), Utc::now()).unwrap();
            ledger.end_session().unwrap();
        }
        ledger.start_session("Game 4", Utc::now()).unwrap();

        let err = ledger.start_session("Game 5", Utc::now()).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(ledger.history().len(), 3);
        assert_eq!(ledger.active_session().unwrap().name, "Game 4");
    }

    #[test]
    fn test_start_session_keeps_given_date() {
        let mut ledger = Ledger::new();
        let date = DateTime::parse_from_rfc3339("2024-03-01T19:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let session = ledger.start_session("Game", date).unwrap();
        assert_eq!(session.date, date);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.participants.is_empty());
        assert_eq!(ledger.end_session().unwrap().date, date);
    }

    #[test]
    fn test_add_participant_rejections() {
        let (mut ledger, ids) = ledger_with_players(&["Alice"]);
        let session = ledger.start_session("Game", Utc::now()).unwrap();

        let err = ledger
            .add_participant(&session.id, &ids[0], Decimal::ZERO)
            .unwrap_err();
        assert!(err.is_validation());

        let err = ledger
            .add_participant(&session.id, &PlayerId::from("ghost"), dec!(10))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = ledger
            .add_participant(&SessionId::from("other"), &ids[0], dec!(10))
            .unwrap_err();
        assert!(err.is_not_found());

        ledger.add_participant(&session.id, &ids[0], dec!(10)).unwrap();
        let err = ledger
            .add_participant(&session.id, &ids[0], dec!(10))
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(ledger.active_session().unwrap().participants.len(), 1);
    }

    #[test]
    fn test_add_participant_to_completed_session_is_not_found() {
        let (mut ledger, ids) = ledger_with_players(&["Alice"]);
        let session = ledger.start_session("Game", Utc::now()).unwrap();
        ledger.end_session().unwrap();

        let err = ledger
            .add_participant(&session.id, &ids[0], dec!(10))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_participant_rejects_negative_values() {
        let (mut ledger, session_id, alice, _) = alice_bob_session();
        let before = ledger.clone();
        for amounts in [
            ParticipationAmounts::new(dec!(-1), dec!(0), dec!(0)),
            ParticipationAmounts::new(dec!(1), dec!(-0.01), dec!(0)),
            ParticipationAmounts::new(dec!(1), dec!(0), dec!(-3)),
        ] {
            let err = ledger
                .update_participant(&session_id, &alice, amounts)
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_amounts_above_the_limit_are_rejected() {
        let (mut ledger, session_id, alice, _) = alice_bob_session();
        let carol = ledger.add_player("Carol", ContactDetails::default()).unwrap().id;
        let before = ledger.clone();

        for buy_in in [Decimal::MAX, MAX_AMOUNT + dec!(0.01)] {
            let err = ledger.add_participant(&session_id, &carol, buy_in).unwrap_err();
            assert!(err.is_validation());
        }
        for amounts in [
            ParticipationAmounts::new(Decimal::MAX, dec!(0), dec!(0)),
            ParticipationAmounts::new(dec!(10), Decimal::MAX, dec!(0)),
            ParticipationAmounts::new(dec!(10), dec!(0), MAX_AMOUNT + dec!(1)),
        ] {
            let err = ledger
                .update_participant(&session_id, &alice, amounts)
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(ledger, before);
        assert!(ledger.balance_check().is_ok());
    }

    #[test]
    fn test_amounts_at_the_limit_aggregate() {
        let (mut ledger, ids) = ledger_with_players(&["Alice", "Bob"]);
        let session = ledger.start_session("High stakes", Utc::now()).unwrap();
        for id in &ids {
            ledger.add_participant(&session.id, id, MAX_AMOUNT).unwrap();
            ledger
                .update_participant(
                    &session.id,
                    id,
                    ParticipationAmounts::new(MAX_AMOUNT, MAX_AMOUNT, MAX_AMOUNT),
                )
                .unwrap();
        }

        let check = ledger.balance_check().unwrap();
        assert_eq!(check.totals.total_in, MAX_AMOUNT * dec!(4));
        assert_eq!(check.totals.balance, -MAX_AMOUNT * dec!(2));
        ledger.end_session().unwrap();
        assert_eq!(
            player_totals(&ids[0], ledger.history()).total_buy_ins,
            MAX_AMOUNT * dec!(2)
        );
    }

    #[test]
    fn test_add_then_remove_participant_restores_list() {
        let (mut ledger, session_id, _, _) = alice_bob_session();
        let carol = ledger.add_player("Carol", ContactDetails::default()).unwrap().id;
        let before = ledger.active_session().unwrap().participants.clone();

        ledger.add_participant(&session_id, &carol, dec!(25)).unwrap();
        let removed = ledger.remove_participant(&session_id, &carol).unwrap();

        assert_eq!(removed.buy_in, dec!(25));
        assert_eq!(ledger.active_session().unwrap().participants, before);
    }

    #[test]
    fn test_remove_unknown_participant_is_not_found() {
        let (mut ledger, session_id, _, _) = alice_bob_session();
        let err = ledger
            .remove_participant(&session_id, &PlayerId::from("ghost"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_end_session_moves_to_history() {
        let (mut ledger, session_id, _, _) = alice_bob_session();
        let check = ledger.balance_check().unwrap();
        assert!(!check.needs_confirmation);
        assert_eq!(check.totals.total_in, dec!(25));

        let ended = ledger.end_session().unwrap();
        assert_eq!(ended.id, session_id);
        assert_eq!(ended.status, SessionStatus::Completed);
        assert!(ledger.active_session().is_none());
        assert_eq!(ledger.history().len(), 1);

        assert!(ledger.end_session().unwrap_err().is_conflict());
        assert!(ledger.balance_check().unwrap_err().is_conflict());
    }

    #[test]
    fn test_unbalanced_session_is_flagged_but_still_ends() {
        let (mut ledger, ids) = ledger_with_players(&["A", "B"]);
        let session = ledger.start_session("Short", Utc::now()).unwrap();
        ledger.add_participant(&session.id, &ids[0], dec!(60)).unwrap();
        ledger.add_participant(&session.id, &ids[1], dec!(40)).unwrap();
        ledger
            .update_participant(&session.id, &ids[0], ParticipationAmounts::new(dec!(60), dec!(0), dec!(50)))
            .unwrap();
        ledger
            .update_participant(&session.id, &ids[1], ParticipationAmounts::new(dec!(40), dec!(0), dec!(40)))
            .unwrap();

        let check = ledger.balance_check().unwrap();
        assert_eq!(check.totals.balance, dec!(-10));
        assert!(check.needs_confirmation);

        let ended = ledger.end_session().unwrap();
        assert_eq!(ended.status, SessionStatus::Completed);
        assert!(ledger.active_session().is_none());
    }

    #[test]
    fn test_deleting_player_keeps_participation() {
        let (mut ledger, session_id, alice, _) = alice_bob_session();
        ledger.end_session().unwrap();

        ledger.delete_player(&alice).unwrap();

        let session = ledger.session(&session_id).unwrap();
        let participation = session.participant(&alice).unwrap();
        assert_eq!(participation.profit(), dec!(5));

        let totals = player_totals(&alice, ledger.all_sessions());
        assert_eq!(totals.profit, dec!(5));
        assert_eq!(ledger.resolve_player(&alice).display_name(), "Unknown Player");
    }

    #[test]
    fn test_delete_unknown_player_is_not_found() {
        let mut ledger = Ledger::new();
        assert!(ledger.delete_player(&PlayerId::from("x")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_session() {
        let (mut ledger, session_id, _, _) = alice_bob_session();

        let err = ledger.delete_session(&session_id).unwrap_err();
        assert!(err.is_conflict());

        ledger.end_session().unwrap();
        let removed = ledger.delete_session(&session_id).unwrap();
        assert_eq!(removed.id, session_id);
        assert!(ledger.history().is_empty());

        assert!(ledger.delete_session(&session_id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_all_sessions_lists_history_then_active() {
        let mut ledger = Ledger::new();
        ledger.start_session("One", Utc::now()).unwrap();
        ledger.end_session().unwrap();
        ledger.start_session("Two", Utc::now()).unwrap();

        let names: Vec<_> = ledger.all_sessions().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two"]);
    }

    #[test]
    fn test_from_parts_round_trip() {
        let (ledger, _, _, _) = alice_bob_session();
        let (players, history, active) = ledger.clone().into_parts();
        let rebuilt = Ledger::from_parts(players, history, active).unwrap();
        assert_eq!(rebuilt, ledger);
    }

    #[test]
    fn test_from_parts_rejects_broken_invariants() {
        let (ledger, _, _, _) = alice_bob_session();
        let (players, history, active) = ledger.into_parts();
        let active = active.unwrap();

        // An active session filed under history.
        let err = Ledger::from_parts(players.clone(), vec![active.clone()], None).unwrap_err();
        assert!(err.is_conflict());

        // Duplicate participant.
        let mut doubled = active.clone();
        doubled.participants.push(doubled.participants[0].clone());
        let err = Ledger::from_parts(players.clone(), history.clone(), Some(doubled)).unwrap_err();
        assert!(err.is_conflict());

        // Amount beyond the limit.
        let mut inflated = active.clone();
        inflated.participants[0].cash_out = Decimal::MAX;
        let err = Ledger::from_parts(players.clone(), history.clone(), Some(inflated)).unwrap_err();
        assert!(err.is_validation());

        // Duplicate player id.
        let mut twice = players.clone();
        twice.push(players[0].clone());
        let err = Ledger::from_parts(twice, history, Some(active)).unwrap_err();
        assert!(err.is_conflict());
    }
}
