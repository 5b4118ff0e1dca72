//! Settlement planning.

use crate::player::{Player, PlayerId};
use crate::session::Session;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Which side of a session is being settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SettlementDirection {
    /// Players who lost pay the host.
    Collect,
    /// The host pays out players who won.
    Distribute,
}

impl fmt::Display for SettlementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementDirection::Collect => f.write_str("collect"),
            SettlementDirection::Distribute => f.write_str("distribute"),
        }
    }
}

/// One player to be paid or to pay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub email: Option<String>,
    /// Always positive
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettlementPlan {
    /// Participants with a loss, owing its absolute value
    pub debtors: Vec<SettlementEntry>,
    /// Participants with a profit
    pub winners: Vec<SettlementEntry>,
}

impl SettlementPlan {
    pub fn entries(&self, direction: SettlementDirection) -> &[SettlementEntry] {
        match direction {
            SettlementDirection::Collect => &self.debtors,
            SettlementDirection::Distribute => &self.winners,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.debtors.is_empty() && self.winners.is_empty()
    }
}

/// Splits the participants of `session` into debtors and winners.
///
/// Participants whose player record no longer exists are left out: a payment
/// link needs a payee with a name. Break-even players appear on neither side.
pub fn plan_settlement(session: &Session, players: &[Player]) -> SettlementPlan {
    let mut plan = SettlementPlan::default();

    for participation in &session.participants {
        let Some(player) = players.iter().find(|p| p.id == participation.player_id) else {
            tracing::debug!(
                "[Settlement] Skipping participant {} with no player record",
                participation.player_id
            );
            continue;
        };

        let profit = participation.profit();
        let entry = SettlementEntry {
            player_id: player.id.clone(),
            name: player.name.clone(),
            email: player.email.clone(),
            amount: profit.abs(),
        };
        if profit < Decimal::ZERO {
            plan.debtors.push(entry);
        } else if profit > Decimal::ZERO {
            plan.winners.push(entry);
        }
    }

    plan
}

/// The note attached to every payment of a session.
pub fn payment_description(session: &Session, direction: SettlementDirection) -> String {
    match direction {
        SettlementDirection::Collect => {
            format!("Payment for {} on {}", session.name, session.day())
        }
        SettlementDirection::Distribute => {
            format!("Winnings from {} on {}", session.name, session.day())
        }
    }
}
