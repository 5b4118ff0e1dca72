mod app;
mod commands;
mod helper;
mod view;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use pokerbook_application::LedgerUseCase;
use pokerbook_infrastructure::{ConfigService, JsonLedgerRepository, PokerbookPaths};

use crate::app::{App, Flow, print_notice};
use crate::helper::CliHelper;

/// Logs go to a daily file so they never interleave with the prompt.
fn init_tracing() -> Result<WorkerGuard> {
    let logs_dir = PokerbookPaths::logs_dir()?;
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&logs_dir, "pokerbook.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn ask(rl: &mut Editor<CliHelper, DefaultHistory>, prompt: &str) -> bool {
    match rl.readline(&prompt.yellow().to_string()) {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing()?;

    // ===== Backend Initialization =====
    let config_service = ConfigService::from_env()?;
    let config = config_service
        .get_config()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
    let data_file = config_service.data_file()?;
    tracing::info!("[Startup] Ledger file {}", data_file.display());

    let repository = Arc::new(JsonLedgerRepository::new(data_file));
    let usecase = LedgerUseCase::load(repository).await?;

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let mut app = App::new(
        usecase,
        config_service,
        PokerbookPaths::qr_codes_dir()?,
        notice_tx,
    )?;

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    let helper = CliHelper::new();
    helper.set_player_names(app.player_names());
    rl.set_helper(Some(helper.clone()));

    println!("{}", format!("=== {} ===", config.app_name).bright_magenta().bold());
    println!("{}", "Type 'help' for commands, 'quit' to exit.".bright_black());
    println!();

    // ===== Main REPL Loop =====
    loop {
        while let Ok(notice) = notice_rx.try_recv() {
            print_notice(&notice);
        }

        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match commands::parse(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", format!("{e:#}").red());
                        continue;
                    }
                };

                let mut confirm = |prompt: &str| ask(&mut rl, prompt);
                match app.execute(command, &mut confirm).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => println!("{}", format!("{e:#}").red()),
                }
                helper.set_player_names(app.player_names());
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    app.shutdown().await?;
    while let Ok(notice) = notice_rx.try_recv() {
        print_notice(&notice);
    }
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
