//! Tabular reports of the ledger.
//!
//! These tables are what the spreadsheet sync writes, one table per tab. Cells
//! are plain strings: amounts carry two decimal places and dates are rendered
//! as `YYYY-MM-DD`.

use crate::aggregation::{all_player_summaries, session_totals};
use crate::ledger::Ledger;
use crate::money::format_amount;
use serde::Serialize;

pub const PLAYERS_TAB: &str = "Players";
pub const SESSIONS_TAB: &str = "Sessions";
pub const SESSION_DETAILS_TAB: &str = "Session Details";

pub const PLAYERS_HEADER: [&str; 5] = [
    "Player ID",
    "Name",
    "Total Sessions",
    "Total Buy-ins",
    "Total Profit",
];

pub const SESSIONS_HEADER: [&str; 6] = [
    "Session ID",
    "Name",
    "Date",
    "Players",
    "Total Buy-ins",
    "Total Cash-outs",
];

pub const SESSION_DETAILS_HEADER: [&str; 8] = [
    "Session ID",
    "Player ID",
    "Player Name",
    "Buy-in",
    "Rebuys",
    "Total In",
    "Cash-out",
    "Profit/Loss",
];

/// A named table with a header row and data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(name: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }
}

/// One row per player with lifetime totals.
pub fn players_table(ledger: &Ledger) -> Table {
    let rows = all_player_summaries(ledger.players(), ledger.all_sessions())
        .into_iter()
        .map(|summary| {
            vec![
                summary.player_id.to_string(),
                summary.name,
                summary.totals.sessions_played.to_string(),
                format_amount(summary.totals.total_buy_ins),
                format_amount(summary.totals.profit),
            ]
        })
        .collect();
    Table::new(PLAYERS_TAB, &PLAYERS_HEADER, rows)
}

/// One row per session, history first. Buy-ins include rebuys.
pub fn sessions_table(ledger: &Ledger) -> Table {
    let rows = ledger
        .all_sessions()
        .map(|session| {
            let totals = session_totals(session);
            vec![
                session.id.to_string(),
                session.name.clone(),
                session.day(),
                totals.player_count.to_string(),
                format_amount(totals.total_in),
                format_amount(totals.total_cash_out),
            ]
        })
        .collect();
    Table::new(SESSIONS_TAB, &SESSIONS_HEADER, rows)
}

/// One row per participation across all sessions.
pub fn session_details_table(ledger: &Ledger) -> Table {
    let rows = ledger
        .all_sessions()
        .flat_map(|session| {
            session.participants.iter().map(move |p| {
                vec![
                    session.id.to_string(),
                    p.player_id.to_string(),
                    ledger.resolve_player(&p.player_id).display_name().to_string(),
                    format_amount(p.buy_in),
                    format_amount(p.rebuys),
                    format_amount(p.total_in()),
                    format_amount(p.cash_out),
                    format_amount(p.profit()),
                ]
            })
        })
        .collect();
    Table::new(SESSION_DETAILS_TAB, &SESSION_DETAILS_HEADER, rows)
}

/// All three tables in the order they are synced.
pub fn all_tables(ledger: &Ledger) -> Vec<Table> {
    vec![
        players_table(ledger),
        sessions_table(ledger),
        session_details_table(ledger),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ContactDetails;
    use crate::session::ParticipationAmounts;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let alice = ledger.add_player("Alice", ContactDetails::default()).unwrap().id;
        let bob = ledger.add_player("Bob", ContactDetails::default()).unwrap().id;
        let date = Utc.with_ymd_and_hms(2024, 5, 17, 20, 0, 0).unwrap();
        let session = ledger.start_session("Friday", date).unwrap();
        ledger.add_participant(&session.id, &alice, dec!(10)).unwrap();
        ledger.add_participant(&session.id, &bob, dec!(10)).unwrap();
        ledger
            .update_participant(&session.id, &alice, ParticipationAmounts::new(dec!(10), dec!(5), dec!(20)))
            .unwrap();
        ledger
            .update_participant(&session.id, &bob, ParticipationAmounts::new(dec!(10), dec!(0), dec!(5)))
            .unwrap();
        ledger.end_session().unwrap();
        ledger
    }

    #[test]
    fn test_players_table() {
        let ledger = sample_ledger();
        let table = players_table(&ledger);
        assert_eq!(table.name, "Players");
        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], "Alice");
        assert_eq!(table.rows[0][2], "1");
        assert_eq!(table.rows[0][3], "15.00");
        assert_eq!(table.rows[0][4], "5.00");
        assert_eq!(table.rows[1][4], "-5.00");
    }

    #[test]
    fn test_sessions_table_counts_rebuys() {
        let ledger = sample_ledger();
        let table = sessions_table(&ledger);
        assert_eq!(
            table.rows[0][1..].to_vec(),
            vec!["Friday", "2024-05-17", "2", "25.00", "25.00"]
        );
    }

    #[test]
    fn test_details_table_marks_deleted_players() {
        let mut ledger = sample_ledger();
        let alice = ledger.players()[0].id.clone();
        ledger.delete_player(&alice).unwrap();

        let table = session_details_table(&ledger);
        assert_eq!(table.rows.len(), 2);
        let row = &table.rows[0];
        assert_eq!(row[1], alice.to_string());
        assert_eq!(row[2], "Unknown Player");
        assert_eq!(row[5], "15.00");
        assert_eq!(row[7], "5.00");
    }

    #[test]
    fn test_empty_ledger_produces_headers_only() {
        let tables = all_tables(&Ledger::new());
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Players", "Sessions", "Session Details"]);
        assert!(tables.iter().all(|t| t.rows.is_empty()));
        assert_eq!(tables[2].headers[7], "Profit/Loss");
    }
}
