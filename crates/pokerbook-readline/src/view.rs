//! Plain-text rendering of ledger data for the terminal.

use pokerbook_core::aggregation::{all_player_summaries, session_totals};
use pokerbook_core::config::AppConfig;
use pokerbook_core::money::{format_currency, round_cents};
use pokerbook_core::{Ledger, Session};
use rust_decimal::Decimal;

pub fn players(ledger: &Ledger, symbol: &str) -> Vec<String> {
    if ledger.players().is_empty() {
        return vec!["No players yet. Add one with 'player add <name>'.".to_string()];
    }

    let mut lines = vec![format!(
        "{:<20} {:>8} {:>12} {:>12}  {}",
        "Name", "Sessions", "Buy-ins", "Profit", "Email"
    )];
    for (player, summary) in ledger
        .players()
        .iter()
        .zip(all_player_summaries(ledger.players(), ledger.all_sessions()))
    {
        lines.push(format!(
            "{:<20} {:>8} {:>12} {:>12}  {}",
            player.name,
            summary.totals.sessions_played,
            format_currency(summary.totals.total_buy_ins, symbol),
            signed(summary.totals.profit, symbol),
            player.email.as_deref().unwrap_or("-")
        ));
    }
    lines
}

pub fn session(ledger: &Ledger, session: &Session, symbol: &str) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}) [{}]",
        session.name,
        session.day(),
        session.status
    )];

    if session.participants.is_empty() {
        lines.push("  no players seated".to_string());
        return lines;
    }
    lines.push(format!(
        "  {:<20} {:>10} {:>10} {:>10} {:>10}",
        "Player", "Buy-in", "Rebuys", "Cash-out", "P/L"
    ));
    for p in &session.participants {
        lines.push(format!(
            "  {:<20} {:>10} {:>10} {:>10} {:>10}",
            ledger.resolve_player(&p.player_id).display_name(),
            format_currency(p.buy_in, symbol),
            format_currency(p.rebuys, symbol),
            format_currency(p.cash_out, symbol),
            signed(p.profit(), symbol)
        ));
    }

    let totals = session_totals(session);
    lines.push(format!(
        "  In: {}  Out: {}  Balance: {}",
        format_currency(totals.total_in, symbol),
        format_currency(totals.total_cash_out, symbol),
        signed(totals.balance, symbol)
    ));
    lines
}

pub fn history(ledger: &Ledger, symbol: &str) -> Vec<String> {
    if ledger.history().is_empty() {
        return vec!["No completed sessions.".to_string()];
    }
    ledger
        .history()
        .iter()
        .enumerate()
        .map(|(index, session)| {
            let totals = session_totals(session);
            format!(
                "{:>3}. {} {:<24} {} players, {} in play",
                index + 1,
                session.day(),
                session.name,
                totals.player_count,
                format_currency(totals.total_in, symbol)
            )
        })
        .collect()
}

/// Overall figures plus a leaderboard sorted by profit.
pub fn stats(ledger: &Ledger, symbol: &str) -> Vec<String> {
    let sessions: Vec<&Session> = ledger.all_sessions().collect();
    let money_in_play: Decimal = sessions.iter().map(|s| session_totals(s).total_in).sum();

    let mut lines = vec![
        format!("Sessions: {}", sessions.len()),
        format!("Total buy-ins: {}", format_currency(money_in_play, symbol)),
    ];

    let mut summaries = all_player_summaries(ledger.players(), ledger.all_sessions());
    if summaries.is_empty() {
        lines.push("No player data available".to_string());
        return lines;
    }
    summaries.sort_by(|a, b| b.totals.profit.cmp(&a.totals.profit));

    lines.push(format!(
        "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "Player", "Sessions", "Buy-ins", "Cash-outs", "Profit", "Avg/session"
    ));
    for summary in summaries {
        let totals = summary.totals;
        lines.push(format!(
            "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12}",
            summary.name,
            totals.sessions_played,
            format_currency(totals.total_buy_ins, symbol),
            format_currency(totals.total_cash_outs, symbol),
            signed(totals.profit, symbol),
            signed(totals.avg_profit_per_session, symbol)
        ));
    }
    lines
}

/// One line per setting; secrets arrive already masked.
pub fn settings(config: &AppConfig) -> Vec<String> {
    config
        .settings()
        .into_iter()
        .map(|(key, value)| {
            let value = if value.is_empty() {
                "(not set)".to_string()
            } else {
                value
            };
            format!("{key:<24} {value}")
        })
        .collect()
}

pub fn signed(amount: Decimal, symbol: &str) -> String {
    let text = format_currency(amount, symbol);
    if round_cents(amount) > Decimal::ZERO {
        format!("+{text}")
    } else {
        text
    }
}
