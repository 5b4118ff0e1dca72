//! Aggregation engine.
//!
//! Pure, derive-on-read functions over ledger data. Nothing here is cached:
//! ledgers are small and recomputing keeps every figure consistent with the
//! records it came from.
//!
//! Rebuys are always part of the cost basis. "Total buy-ins" in every report
//! means `buy_in + rebuys`.

use crate::player::{Player, PlayerId};
use crate::session::Session;
use rust_decimal::Decimal;
use serde::Serialize;

/// Largest absolute balance (in currency units) still treated as balanced.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Lifetime figures for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerTotals {
    pub sessions_played: usize,
    /// Sum of `buy_in + rebuys`
    pub total_buy_ins: Decimal,
    pub total_cash_outs: Decimal,
    pub profit: Decimal,
    pub avg_profit_per_session: Decimal,
}

impl PlayerTotals {
    fn empty() -> Self {
        Self {
            sessions_played: 0,
            total_buy_ins: Decimal::ZERO,
            total_cash_outs: Decimal::ZERO,
            profit: Decimal::ZERO,
            avg_profit_per_session: Decimal::ZERO,
        }
    }
}

/// Money totals for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionTotals {
    pub player_count: usize,
    pub total_buy_in: Decimal,
    pub total_rebuys: Decimal,
    pub total_cash_out: Decimal,
    /// `total_buy_in + total_rebuys`
    pub total_in: Decimal,
    /// `total_cash_out - total_in`; nonzero means a data-entry mistake
    pub balance: Decimal,
}

impl SessionTotals {
    /// Whether the balance is within [`BALANCE_TOLERANCE`].
    pub fn is_balanced(&self) -> bool {
        self.balance.abs() <= BALANCE_TOLERANCE
    }
}

/// One row of the player statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub totals: PlayerTotals,
}

/// Computes the lifetime totals of `player_id` across `sessions`.
///
/// The player does not need to exist in the player set; deleted players still
/// aggregate from their historical participations.
pub fn player_totals<'a, I>(player_id: &PlayerId, sessions: I) -> PlayerTotals
where
    I: IntoIterator<Item = &'a Session>,
{
    let mut totals = PlayerTotals::empty();

    for participation in sessions
        .into_iter()
        .flat_map(|session| session.participants.iter())
        .filter(|p| &p.player_id == player_id)
    {
        totals.sessions_played += 1;
        totals.total_buy_ins += participation.total_in();
        totals.total_cash_outs += participation.cash_out;
    }

    totals.profit = totals.total_cash_outs - totals.total_buy_ins;
    if totals.sessions_played > 0 {
        totals.avg_profit_per_session = totals.profit / Decimal::from(totals.sessions_played);
    }

    totals
}

/// Computes the money totals of a single session.
pub fn session_totals(session: &Session) -> SessionTotals {
    let mut total_buy_in = Decimal::ZERO;
    let mut total_rebuys = Decimal::ZERO;
    let mut total_cash_out = Decimal::ZERO;

    for p in &session.participants {
        total_buy_in += p.buy_in;
        total_rebuys += p.rebuys;
        total_cash_out += p.cash_out;
    }

    let total_in = total_buy_in + total_rebuys;
    SessionTotals {
        player_count: session.participants.len(),
        total_buy_in,
        total_rebuys,
        total_cash_out,
        total_in,
        balance: total_cash_out - total_in,
    }
}

/// One summary per player, in the iteration order of `players`.
pub fn all_player_summaries<'a, I>(players: &[Player], sessions: I) -> Vec<PlayerSummary>
where
    I: IntoIterator<Item = &'a Session>,
    I::IntoIter: Clone,
{
    let sessions = sessions.into_iter();
    players
        .iter()
        .map(|player| PlayerSummary {
            player_id: player.id.clone(),
            name: player.name.clone(),
            totals: player_totals(&player.id, sessions.clone()),
        })
        .collect()
}
