//! REPL command parsing.
//!
//! Players are named by name (case-insensitive) or id. Completed sessions are
//! named by their 1-based number in `history`.

use anyhow::{Context, Result, anyhow, bail};
use pokerbook_core::settlement::SettlementDirection;
use pokerbook_core::{ContactDetails, PlayerUpdate};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

/// Top-level words offered by completion.
pub const COMMAND_WORDS: &[&str] = &[
    "players",
    "player",
    "session",
    "history",
    "stats",
    "sync",
    "collect",
    "distribute",
    "export",
    "import",
    "save",
    "settings",
    "help",
    "quit",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Players,
    AddPlayer {
        name: String,
        details: ContactDetails,
    },
    EditPlayer {
        player: String,
        update: PlayerUpdate,
    },
    DeletePlayer {
        player: String,
    },
    StartSession {
        name: String,
    },
    AddParticipant {
        player: String,
        buy_in: Decimal,
    },
    /// Amounts left as `None` keep their current value.
    EditParticipant {
        player: String,
        buy_in: Option<Decimal>,
        rebuys: Option<Decimal>,
        cash_out: Option<Decimal>,
    },
    RemoveParticipant {
        player: String,
    },
    EndSession,
    /// `None` shows the active session.
    ShowSession {
        number: Option<usize>,
    },
    DeleteSession {
        number: usize,
    },
    History,
    Stats,
    Sync,
    /// `None` settles the most recent completed session.
    Settle {
        direction: SettlementDirection,
        number: Option<usize>,
    },
    Export {
        path: PathBuf,
    },
    Import {
        path: PathBuf,
    },
    Save,
    ShowSettings,
    /// `key=value` pairs, applied together or not at all.
    SetSettings {
        changes: Vec<(String, String)>,
    },
    Help,
    Quit,
}

pub const HELP: &str = "\
players                                   list players with lifetime totals
player add <name> [email=..] [phone=..] [note=..]
player edit <player> [name=..] [email=..] [phone=..] [note=..]
player delete <player>
session start <name>                      start the active session
session add <player> <buy-in>             seat a player
session edit <player> [buyin=..] [rebuys=..] [cashout=..]
session remove <player>
session end                               end the active session
session show [n]                          active session, or history entry n
session delete <n>                        delete history entry n
history                                   list completed sessions
stats                                     player statistics
sync                                      push reports to Google Sheets
collect [n] / distribute [n]              payment links for a session
export <file> / import <file>
save
settings [show]                           current configuration
settings set <key>=<value> ...            change and save settings
quit";

pub fn parse(line: &str) -> Result<Command> {
    let tokens = tokenize(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        bail!("empty command");
    };

    match head.to_lowercase().as_str() {
        "players" => no_args(rest, Command::Players),
        "player" => parse_player(rest),
        "session" => parse_session(rest),
        "history" => no_args(rest, Command::History),
        "stats" => no_args(rest, Command::Stats),
        "sync" => no_args(rest, Command::Sync),
        "collect" => parse_settle(SettlementDirection::Collect, rest),
        "distribute" => parse_settle(SettlementDirection::Distribute, rest),
        "export" => Ok(Command::Export {
            path: single_path(rest, "export")?,
        }),
        "import" => Ok(Command::Import {
            path: single_path(rest, "import")?,
        }),
        "save" => no_args(rest, Command::Save),
        "settings" => parse_settings(rest),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => bail!("unknown command '{other}'; type 'help'"),
    }
}

fn parse_player(args: &[String]) -> Result<Command> {
    let Some((sub, rest)) = args.split_first() else {
        bail!("usage: player add|edit|delete ...");
    };
    match sub.as_str() {
        "add" => {
            let (words, options) = split_options(rest);
            let name = words.join(" ");
            if name.trim().is_empty() {
                bail!("usage: player add <name> [email=..] [phone=..] [note=..]");
            }
            let mut details = ContactDetails::default();
            for (key, value) in options {
                match key.as_str() {
                    "email" => details.email = Some(value),
                    "phone" => details.phone = Some(value),
                    "note" => details.note = Some(value),
                    other => bail!("unknown player field '{other}'"),
                }
            }
            Ok(Command::AddPlayer { name, details })
        }
        "edit" => {
            let (words, options) = split_options(rest);
            let player = required_words(&words, "player edit <player> [name=..] ...")?;
            let mut update = PlayerUpdate::default();
            for (key, value) in options {
                match key.as_str() {
                    "name" => update.name = Some(value),
                    "email" => update.email = Some(value),
                    "phone" => update.phone = Some(value),
                    "note" => update.note = Some(value),
                    other => bail!("unknown player field '{other}'"),
                }
            }
            if update == PlayerUpdate::default() {
                bail!("nothing to change; give name=, email=, phone= or note=");
            }
            Ok(Command::EditPlayer { player, update })
        }
        "delete" | "rm" => Ok(Command::DeletePlayer {
            player: required_words(rest, "player delete <player>")?,
        }),
        other => bail!("unknown player command '{other}'"),
    }
}

fn parse_session(args: &[String]) -> Result<Command> {
    let Some((sub, rest)) = args.split_first() else {
        bail!("usage: session start|add|edit|remove|end|show|delete ...");
    };
    match sub.as_str() {
        "start" => Ok(Command::StartSession {
            name: required_words(rest, "session start <name>")?,
        }),
        "add" => {
            let Some((amount, words)) = rest.split_last() else {
                bail!("usage: session add <player> <buy-in>");
            };
            Ok(Command::AddParticipant {
                player: required_words(words, "session add <player> <buy-in>")?,
                buy_in: parse_amount(amount)?,
            })
        }
        "edit" => {
            let (words, options) = split_options(rest);
            let player = required_words(&words, "session edit <player> [buyin=..] ...")?;
            let (mut buy_in, mut rebuys, mut cash_out) = (None, None, None);
            for (key, value) in options {
                let amount = Some(parse_amount(&value)?);
                match key.as_str() {
                    "buyin" | "buy_in" => buy_in = amount,
                    "rebuys" => rebuys = amount,
                    "cashout" | "cash_out" => cash_out = amount,
                    other => bail!("unknown amount '{other}'; use buyin, rebuys or cashout"),
                }
            }
            if buy_in.is_none() && rebuys.is_none() && cash_out.is_none() {
                bail!("nothing to change; give buyin=, rebuys= or cashout=");
            }
            Ok(Command::EditParticipant {
                player,
                buy_in,
                rebuys,
                cash_out,
            })
        }
        "remove" | "rm" => Ok(Command::RemoveParticipant {
            player: required_words(rest, "session remove <player>")?,
        }),
        "end" => no_args(rest, Command::EndSession),
        "show" => Ok(Command::ShowSession {
            number: optional_number(rest)?,
        }),
        "delete" => Ok(Command::DeleteSession {
            number: optional_number(rest)?
                .ok_or_else(|| anyhow!("usage: session delete <n>"))?,
        }),
        other => bail!("unknown session command '{other}'"),
    }
}

fn parse_settle(direction: SettlementDirection, args: &[String]) -> Result<Command> {
    Ok(Command::Settle {
        direction,
        number: optional_number(args)?,
    })
}

fn parse_settings(args: &[String]) -> Result<Command> {
    let Some((sub, rest)) = args.split_first() else {
        return Ok(Command::ShowSettings);
    };
    match sub.as_str() {
        "show" => no_args(rest, Command::ShowSettings),
        "set" => {
            let (words, changes) = split_options(rest);
            if let Some(word) = words.first() {
                bail!("expected key=value, got '{word}'");
            }
            if changes.is_empty() {
                bail!("usage: settings set <key>=<value> ...");
            }
            Ok(Command::SetSettings { changes })
        }
        other => bail!("unknown settings command '{other}'"),
    }
}

/// Parses an amount, ignoring a leading currency symbol.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = raw
        .trim()
        .trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'));
    Decimal::from_str(cleaned).with_context(|| format!("'{raw}' is not an amount"))
}

fn no_args(args: &[String], command: Command) -> Result<Command> {
    if let Some(extra) = args.first() {
        bail!("unexpected argument '{extra}'");
    }
    Ok(command)
}

fn required_words(words: &[String], usage: &str) -> Result<String> {
    let joined = words.join(" ");
    if joined.trim().is_empty() {
        bail!("usage: {usage}");
    }
    Ok(joined)
}

fn optional_number(args: &[String]) -> Result<Option<usize>> {
    match args {
        [] => Ok(None),
        [n] => {
            let number: usize = n
                .parse()
                .with_context(|| format!("'{n}' is not a session number"))?;
            if number == 0 {
                bail!("session numbers start at 1");
            }
            Ok(Some(number))
        }
        _ => bail!("expected at most one session number"),
    }
}

fn single_path(args: &[String], command: &str) -> Result<PathBuf> {
    match args {
        [path] => Ok(PathBuf::from(path)),
        _ => bail!("usage: {command} <file>"),
    }
}

/// Separates `key=value` tokens from plain words.
fn split_options(tokens: &[String]) -> (Vec<String>, Vec<(String, String)>) {
    let mut words = Vec::new();
    let mut options = Vec::new();
    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                options.push((key.to_lowercase(), value.to_string()));
            }
            _ => words.push(token.clone()),
        }
    }
    (words, options)
}

/// Splits on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        bail!("unterminated quote");
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}
