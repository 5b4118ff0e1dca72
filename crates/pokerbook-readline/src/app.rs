//! Command execution for the REPL.

use crate::commands::{Command, HELP};
use crate::view;
use anyhow::{Result, anyhow, bail};
use colored::Colorize;
use pokerbook_application::{
    BOUNDARY_TIMEOUT, LedgerUseCase, Notice, NoticeLevel, SettlementService, SheetSyncService,
    spawn_boundary_job,
};
use pokerbook_core::config::AppConfig;
use pokerbook_core::money::format_currency;
use pokerbook_core::settlement::SettlementDirection;
use pokerbook_core::{Ledger, ParticipationAmounts, PlayerId, Session};
use pokerbook_infrastructure::ConfigService;
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Whether the REPL keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    usecase: LedgerUseCase,
    config_service: ConfigService,
    config: AppConfig,
    qr_dir: PathBuf,
    notices: mpsc::UnboundedSender<Notice>,
}

impl App {
    pub fn new(
        usecase: LedgerUseCase,
        config_service: ConfigService,
        qr_dir: PathBuf,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Result<Self> {
        let config = config_service.get_config()?;
        Ok(Self {
            usecase,
            config_service,
            config,
            qr_dir,
            notices,
        })
    }

    /// Player names for line completion.
    pub fn player_names(&self) -> Vec<String> {
        self.usecase
            .ledger()
            .players()
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    fn symbol(&self) -> &str {
        &self.config.currency_symbol
    }

    /// Runs one command. `confirm` asks the user a yes/no question.
    pub async fn execute(
        &mut self,
        command: Command,
        confirm: &mut dyn FnMut(&str) -> bool,
    ) -> Result<Flow> {
        match command {
            Command::Players => print_lines(view::players(self.usecase.ledger(), self.symbol())),
            Command::AddPlayer { name, details } => {
                let player = self.usecase.add_player(&name, details)?;
                success(format!("Added {}", player.name));
            }
            Command::EditPlayer { player, update } => {
                let id = find_player(self.usecase.ledger(), &player)?;
                let player = self.usecase.update_player(&id, update)?;
                success(format!("Updated {}", player.name));
            }
            Command::DeletePlayer { player } => {
                let id = find_player(self.usecase.ledger(), &player)?;
                let player = self.usecase.delete_player(&id)?;
                success(format!(
                    "Deleted {}; their session records are kept",
                    player.name
                ));
            }
            Command::StartSession { name } => {
                let session = self.usecase.start_session(&name)?;
                success(format!("Started '{}' on {}", session.name, session.day()));
            }
            Command::AddParticipant { player, buy_in } => {
                let session_id = active_session(self.usecase.ledger())?.id.clone();
                let id = find_player(self.usecase.ledger(), &player)?;
                self.usecase.add_participant(&session_id, &id, buy_in)?;
                success(format!(
                    "Seated {} with {}",
                    self.usecase.ledger().resolve_player(&id).display_name(),
                    format_currency(buy_in, self.symbol())
                ));
            }
            Command::EditParticipant {
                player,
                buy_in,
                rebuys,
                cash_out,
            } => {
                let session = active_session(self.usecase.ledger())?;
                let session_id = session.id.clone();
                let id = find_participant(self.usecase.ledger(), session, &player)?;
                let current = session
                    .participant(&id)
                    .ok_or_else(|| anyhow!("'{player}' is not in the active session"))?;
                let amounts = ParticipationAmounts::new(
                    buy_in.unwrap_or(current.buy_in),
                    rebuys.unwrap_or(current.rebuys),
                    cash_out.unwrap_or(current.cash_out),
                );
                let updated = self.usecase.update_participant(&session_id, &id, amounts)?;
                success(format!(
                    "{}: in {}, out {}",
                    self.usecase.ledger().resolve_player(&id).display_name(),
                    format_currency(updated.total_in(), self.symbol()),
                    format_currency(updated.cash_out, self.symbol())
                ));
            }
            Command::RemoveParticipant { player } => {
                let session = active_session(self.usecase.ledger())?;
                let session_id = session.id.clone();
                let id = find_participant(self.usecase.ledger(), session, &player)?;
                self.usecase.remove_participant(&session_id, &id)?;
                success(format!("Removed {player} from the session"));
            }
            Command::EndSession => self.end_session(confirm)?,
            Command::ShowSession { number } => {
                let ledger = self.usecase.ledger();
                let session = match number {
                    Some(n) => history_session(ledger, n)?,
                    None => active_session(ledger)?,
                };
                print_lines(view::session(ledger, session, self.symbol()));
            }
            Command::DeleteSession { number } => {
                let session = history_session(self.usecase.ledger(), number)?;
                let prompt = format!("Delete '{}' from {}? [y/N] ", session.name, session.day());
                if confirm(&prompt) {
                    let id = session.id.clone();
                    let deleted = self.usecase.delete_session(&id)?;
                    success(format!("Deleted '{}'", deleted.name));
                } else {
                    info("Kept the session");
                }
            }
            Command::History => print_lines(view::history(self.usecase.ledger(), self.symbol())),
            Command::Stats => print_lines(view::stats(self.usecase.ledger(), self.symbol())),
            Command::Sync => self.start_sync()?,
            Command::Settle { direction, number } => self.start_settlement(direction, number)?,
            Command::Export { path } => {
                self.usecase.export(&path).await?;
                success(format!("Exported to {}", path.display()));
            }
            Command::Import { path } => {
                let prompt = "Importing replaces all players and sessions. Continue? [y/N] ";
                if confirm(prompt) {
                    let summary = self.usecase.import(&path).await?;
                    success(format!(
                        "Imported {} players and {} sessions",
                        summary.players, summary.sessions
                    ));
                } else {
                    info("Import cancelled");
                }
            }
            Command::Save => {
                self.usecase.save().await?;
                success("Saved".to_string());
            }
            Command::ShowSettings => {
                println!("{}", self.config_service.path().display().to_string().bright_black());
                print_lines(view::settings(&self.config));
            }
            Command::SetSettings { changes } => self.update_settings(&changes)?,
            Command::Help => println!("{}", HELP.bright_black()),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Saves pending changes; called when the REPL exits.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.usecase.is_dirty() {
            self.usecase.save().await?;
            tracing::info!("[Ledger] Saved on exit");
        }
        Ok(())
    }

    fn end_session(&mut self, confirm: &mut dyn FnMut(&str) -> bool) -> Result<()> {
        let check = self.usecase.balance_check()?;
        if check.needs_confirmation {
            let totals = check.totals;
            warn(format!(
                "Session does not balance: {} in, {} out ({})",
                format_currency(totals.total_in, self.symbol()),
                format_currency(totals.total_cash_out, self.symbol()),
                view::signed(totals.balance, self.symbol())
            ));
            if !confirm("End it anyway? [y/N] ") {
                info("Session left open");
                return Ok(());
            }
        }

        let session = self.usecase.end_session()?;
        success(format!("Ended '{}'", session.name));
        if !session.participants.is_empty() {
            info("Use 'collect' or 'distribute' for payment links");
        }
        Ok(())
    }

    /// Saves the changes to `config.json` and rebuilds the payment backend
    /// from the result. The data file location is read once at startup.
    fn update_settings(&mut self, changes: &[(String, String)]) -> Result<()> {
        let config = self.config_service.update_config(|config| {
            for (key, value) in changes {
                config.set(key, value)?;
            }
            Ok(())
        })?;
        let settlement = SettlementService::from_config(&config)?;
        self.config = config;

        success(format!(
            "Saved {} setting(s); payments use the {} backend",
            changes.len(),
            settlement.provider_name()
        ));
        if changes.iter().any(|(key, _)| key == "data_file") {
            info("The new data file is used from the next start");
        }
        Ok(())
    }

    fn start_sync(&self) -> Result<()> {
        if !self.config.sheet_sync_configured() {
            bail!("set google_sheet_name and google_credentials_file to enable sync");
        }
        let snapshot = self.usecase.snapshot();
        let config = self.config.clone();
        spawn_boundary_job("Sheet sync", BOUNDARY_TIMEOUT, self.notices.clone(), async move {
            let service = SheetSyncService::connect(&config).await?;
            let report = service.sync(&snapshot).await?;
            Ok(report.summary())
        });
        info("Syncing in the background...");
        Ok(())
    }

    fn start_settlement(
        &self,
        direction: SettlementDirection,
        number: Option<usize>,
    ) -> Result<()> {
        let snapshot = self.usecase.snapshot();
        let session = match number {
            Some(n) => history_session(&snapshot, n)?.clone(),
            None => snapshot
                .history()
                .last()
                .cloned()
                .ok_or_else(|| anyhow!("no completed session to settle"))?,
        };

        let config = self.config.clone();
        let qr_dir = self.qr_dir.clone();
        let title = match direction {
            SettlementDirection::Collect => format!("Collect for '{}'", session.name),
            SettlementDirection::Distribute => format!("Payouts for '{}'", session.name),
        };
        spawn_boundary_job(title, BOUNDARY_TIMEOUT, self.notices.clone(), async move {
            let service = SettlementService::from_config(&config)?;
            let tickets = service
                .prepare(&session, snapshot.players(), direction)
                .await;
            if tickets.is_empty() {
                return Ok("Nobody to settle with".to_string());
            }

            let mut message = String::new();
            for ticket in &tickets {
                let _ = write!(message, "\n{}", ticket.headline(&config.currency_symbol));
                match (&ticket.link, &ticket.note) {
                    (Some(link), _) => {
                        let _ = write!(message, "\n  {} ({})", link.target, link.source);
                    }
                    (None, Some(note)) => {
                        let _ = write!(message, "\n  {note}");
                    }
                    (None, None) => {}
                }
                if let Some(path) = ticket.save_code(&qr_dir, &session)? {
                    let _ = write!(message, "\n  QR: {}", path.display());
                }
            }
            Ok(message)
        });
        info("Preparing payment links in the background...");
        Ok(())
    }
}

pub fn print_notice(notice: &Notice) {
    let title = format!("[{}]", notice.title);
    match notice.level {
        NoticeLevel::Info => {
            println!("{} {}", title.bright_green(), notice.message)
        }
        NoticeLevel::Warning => {
            println!("{} {}", title.yellow(), notice.message.yellow())
        }
        NoticeLevel::Error => {
            println!("{} {}", title.red(), notice.message.red())
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn success(message: String) {
    println!("{}", message.green());
}

fn info(message: &str) {
    println!("{}", message.bright_black());
}

fn warn(message: String) {
    println!("{}", message.yellow());
}

fn active_session(ledger: &Ledger) -> Result<&Session> {
    ledger
        .active_session()
        .ok_or_else(|| anyhow!("no active session; start one with 'session start <name>'"))
}

fn history_session(ledger: &Ledger, number: usize) -> Result<&Session> {
    number
        .checked_sub(1)
        .and_then(|index| ledger.history().get(index))
        .ok_or_else(|| {
            anyhow!(
                "no session #{number}; history has {}",
                ledger.history().len()
            )
        })
}

/// Finds a player by id or by case-insensitive name.
pub fn find_player(ledger: &Ledger, key: &str) -> Result<PlayerId> {
    let key = key.trim();
    if let Some(player) = ledger.players().iter().find(|p| p.id.as_str() == key) {
        return Ok(player.id.clone());
    }

    let matches: Vec<_> = ledger
        .players()
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(key))
        .collect();
    match matches.as_slice() {
        [player] => Ok(player.id.clone()),
        [] => bail!("no player named '{key}'"),
        _ => bail!("{} players are named '{key}'; use the player id", matches.len()),
    }
}

/// Like [`find_player`], but also accepts the raw id of a participant whose
/// player record was deleted.
fn find_participant(ledger: &Ledger, session: &Session, key: &str) -> Result<PlayerId> {
    match find_player(ledger, key) {
        Ok(id) => Ok(id),
        Err(e) => session
            .participants
            .iter()
            .find(|p| p.player_id.as_str() == key.trim())
            .map(|p| p.player_id.clone())
            .ok_or(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pokerbook_core::repository::LedgerRepository;
    use pokerbook_core::{ContactDetails, PlayerUpdate};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct NullRepository;

    #[async_trait]
    impl LedgerRepository for NullRepository {
        async fn load(&self) -> pokerbook_core::Result<Option<Ledger>> {
            Ok(None)
        }

        async fn save(&self, _ledger: &Ledger) -> pokerbook_core::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        app: App,
        notices: mpsc::UnboundedReceiver<Notice>,
        temp_dir: TempDir,
    }

    async fn harness() -> Harness {
        let temp_dir = TempDir::new().unwrap();
        let config_service =
            ConfigService::with_lookup(temp_dir.path().join("config.json"), |_| None);
        let usecase = LedgerUseCase::load(Arc::new(NullRepository)).await.unwrap();
        let (tx, notices) = mpsc::unbounded_channel();
        let app = App::new(usecase, config_service, temp_dir.path().join("qr"), tx).unwrap();
        Harness {
            app,
            notices,
            temp_dir,
        }
    }

    async fn run(app: &mut App, line: &str, answer: bool) -> Result<Flow> {
        let command = crate::commands::parse(line)?;
        app.execute(command, &mut |_| answer).await
    }

    #[test]
    fn test_find_player_by_name_or_id() {
        let mut ledger = Ledger::new();
        let alice = ledger.add_player("Alice", ContactDetails::default()).unwrap();
        ledger.add_player("Bob", ContactDetails::default()).unwrap();

        assert_eq!(find_player(&ledger, "alice").unwrap(), alice.id);
        assert_eq!(find_player(&ledger, alice.id.as_str()).unwrap(), alice.id);
        assert!(find_player(&ledger, "Carol").is_err());
    }

    #[test]
    fn test_find_player_rejects_ambiguous_names() {
        let mut ledger = Ledger::new();
        ledger.add_player("Sam", ContactDetails::default()).unwrap();
        ledger.add_player("sam", ContactDetails::default()).unwrap();
        let err = find_player(&ledger, "SAM").unwrap_err();
        assert!(err.to_string().contains("use the player id"));
    }

    #[test]
    fn test_find_participant_after_player_deleted() {
        let mut ledger = Ledger::new();
        let alice = ledger.add_player("Alice", ContactDetails::default()).unwrap();
        let session = ledger.start_session("Friday", Utc::now()).unwrap();
        ledger.add_participant(&session.id, &alice.id, dec!(10)).unwrap();
        ledger.delete_player(&alice.id).unwrap();

        let active = ledger.active_session().unwrap();
        assert_eq!(
            find_participant(&ledger, active, alice.id.as_str()).unwrap(),
            alice.id
        );
    }

    #[tokio::test]
    async fn test_unbalanced_end_needs_confirmation() {
        let Harness { mut app, notices: _rx, temp_dir: _temp } = harness().await;
        run(&mut app, "player add Alice", true).await.unwrap();
        run(&mut app, "session start Friday", true).await.unwrap();
        run(&mut app, "session add alice 20", true).await.unwrap();

        run(&mut app, "session end", false).await.unwrap();
        assert!(app.usecase.ledger().active_session().is_some());

        run(&mut app, "session end", true).await.unwrap();
        assert!(app.usecase.ledger().active_session().is_none());
        assert_eq!(app.usecase.ledger().history().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_participant_edit_keeps_other_amounts() {
        let Harness { mut app, notices: _rx, temp_dir: _temp } = harness().await;
        run(&mut app, "player add Alice", true).await.unwrap();
        run(&mut app, "session start Friday", true).await.unwrap();
        run(&mut app, "session add Alice 20", true).await.unwrap();
        run(&mut app, "session edit Alice cashout=35", true).await.unwrap();

        let ledger = app.usecase.ledger();
        let alice = find_player(ledger, "Alice").unwrap();
        let seat = ledger.active_session().unwrap().participant(&alice).unwrap();
        assert_eq!(seat.buy_in, dec!(20));
        assert_eq!(seat.cash_out, dec!(35));
    }

    #[tokio::test]
    async fn test_domain_errors_do_not_change_the_ledger() {
        let Harness { mut app, notices: _rx, temp_dir: _temp } = harness().await;
        run(&mut app, "player add Alice", true).await.unwrap();
        let before = app.usecase.ledger().clone();

        assert!(run(&mut app, "session add Alice 20", true).await.is_err());
        assert!(run(&mut app, "session start Friday", true).await.is_ok());
        assert!(run(&mut app, "session start Saturday", true).await.is_err());
        assert_eq!(app.usecase.ledger().players(), before.players());

        let id = find_player(app.usecase.ledger(), "Alice").unwrap();
        let err = app
            .usecase
            .update_player(&id, PlayerUpdate::rename(" "))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_sync_without_configuration_is_rejected() {
        let Harness { mut app, notices: _rx, temp_dir: _temp } = harness().await;
        assert!(run(&mut app, "sync", true).await.is_err());
    }

    #[tokio::test]
    async fn test_settlement_notice_arrives() {
        let Harness { mut app, notices: mut rx, temp_dir: _temp } = harness().await;
        run(&mut app, "player add Alice", true).await.unwrap();
        run(&mut app, "session start Friday", true).await.unwrap();
        run(&mut app, "session add Alice 20", true).await.unwrap();
        run(&mut app, "session edit Alice cashout=20", true).await.unwrap();
        run(&mut app, "session end", true).await.unwrap();

        run(&mut app, "collect", true).await.unwrap();
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.message, "Nobody to settle with");
    }

    #[tokio::test]
    async fn test_settings_are_saved_and_applied() {
        let Harness { mut app, notices: _rx, temp_dir } = harness().await;
        run(&mut app, "settings set payment_enabled=true payment_provider=direct", true)
            .await
            .unwrap();
        run(&mut app, r#"settings set bank_account_name="Host Account""#, true)
            .await
            .unwrap();

        assert!(app.config.payment_enabled);
        assert_eq!(app.config.bank_account_name.as_deref(), Some("Host Account"));

        let reopened = ConfigService::with_lookup(temp_dir.path().join("config.json"), |_| None);
        let stored = reopened.get_config().unwrap();
        assert_eq!(stored.payment_provider.to_string(), "direct");
        assert_eq!(stored.bank_account_name.as_deref(), Some("Host Account"));
    }

    #[tokio::test]
    async fn test_invalid_setting_changes_nothing() {
        let Harness { mut app, notices: _rx, temp_dir } = harness().await;
        let err = run(&mut app, "settings set app_name=Club payment_enabled=sometimes", true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("sometimes"));
        assert_eq!(app.config, AppConfig::default());

        let reopened = ConfigService::with_lookup(temp_dir.path().join("config.json"), |_| None);
        assert_eq!(reopened.get_config().unwrap().app_name, "Poker Tracker");
    }

    #[tokio::test]
    async fn test_settled_session_uses_saved_bank_account() {
        let Harness { mut app, notices: mut rx, temp_dir: _temp } = harness().await;
        run(&mut app, "settings set bank_account_name=Host", true).await.unwrap();
        run(&mut app, "player add Alice", true).await.unwrap();
        run(&mut app, "player add Bob", true).await.unwrap();
        run(&mut app, "session start Friday", true).await.unwrap();
        run(&mut app, "session add Alice 20", true).await.unwrap();
        run(&mut app, "session add Bob 20", true).await.unwrap();
        run(&mut app, "session edit Alice cashout=40", true).await.unwrap();
        run(&mut app, "session edit Bob cashout=0", true).await.unwrap();
        run(&mut app, "session end", true).await.unwrap();

        run(&mut app, "collect", true).await.unwrap();
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert!(notice.message.contains("Bob owes"));
        assert!(notice.message.contains("Host"));
    }

    #[tokio::test]
    async fn test_quit_stops_the_loop() {
        let Harness { mut app, notices: _rx, temp_dir: _temp } = harness().await;
        assert_eq!(run(&mut app, "quit", true).await.unwrap(), Flow::Quit);
    }
}
