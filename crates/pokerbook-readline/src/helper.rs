//! Line-editor support: completion, hints and highlighting.
//!
//! Completion is context aware. The first word completes to a command, the
//! second to a subcommand, and player slots complete to the names currently in
//! the ledger. `settings set` completes setting keys.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::{Arc, RwLock};

use colored::Colorize;
use pokerbook_core::config::SETTING_KEYS;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::COMMAND_WORDS;

const PLAYER_SUBCOMMANDS: &[&str] = &["add", "edit", "delete"];
const SESSION_SUBCOMMANDS: &[&str] = &["start", "add", "edit", "remove", "end", "show", "delete"];
const SETTINGS_SUBCOMMANDS: &[&str] = &["show", "set"];

/// Shared by the editor and the REPL loop, which refreshes the player names
/// after every command.
#[derive(Clone, Default)]
pub struct CliHelper {
    player_names: Arc<RwLock<Vec<String>>>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_player_names(&self, names: Vec<String>) {
        if let Ok(mut guard) = self.player_names.write() {
            *guard = names;
        }
    }

    fn names(&self) -> Vec<String> {
        self.player_names
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Start offset of the word being completed and its replacements.
fn candidates(line: &str, player_names: &[String]) -> (usize, Vec<String>) {
    let start = line.rfind(' ').map(|i| i + 1).unwrap_or(0);
    let partial = &line[start..];
    let words: Vec<&str> = line[..start].split_whitespace().collect();

    let pool: Vec<String> = match words.as_slice() {
        [] => owned(COMMAND_WORDS),
        ["player"] => owned(PLAYER_SUBCOMMANDS),
        ["session"] => owned(SESSION_SUBCOMMANDS),
        ["settings"] => owned(SETTINGS_SUBCOMMANDS),
        ["player", "edit" | "delete"] | ["session", "add" | "edit" | "remove"] => player_names
            .iter()
            .map(|name| {
                if name.contains(' ') {
                    format!("\"{name}\"")
                } else {
                    name.clone()
                }
            })
            .collect(),
        ["settings", "set", ..] => SETTING_KEYS.iter().map(|key| format!("{key}=")).collect(),
        _ => Vec::new(),
    };

    let partial_lower = partial.to_lowercase();
    let matches = pool
        .into_iter()
        .filter(|candidate| {
            candidate
                .trim_start_matches('"')
                .to_lowercase()
                .starts_with(partial_lower.trim_start_matches('"'))
        })
        .collect();
    (start, matches)
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = candidates(&line[..pos], &self.names());
        let pairs = matches
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    /// Colours the command word, and the subcommand when there is one.
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let head = line.split_whitespace().next().unwrap_or("");
        if !COMMAND_WORDS.contains(&head) {
            return Borrowed(line);
        }
        let head_end = line.find(head).map(|i| i + head.len()).unwrap_or(0);
        let (command, rest) = line.split_at(head_end);
        Owned(format!("{}{}", command.bright_cyan(), rest))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    /// Greyed-out rest of the only possible completion.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || line.ends_with(' ') || line.is_empty() {
            return None;
        }
        let (start, matches) = candidates(line, &self.names());
        match matches.as_slice() {
            [only] => only
                .strip_prefix(&line[start..])
                .filter(|rest| !rest.is_empty())
                .map(|rest| rest.bright_black().to_string()),
            _ => None,
        }
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Alice".to_string(), "Big Al".to_string(), "Bob".to_string()]
    }

    #[test]
    fn test_first_word_completes_commands() {
        let (start, matches) = candidates("se", &names());
        assert_eq!(start, 0);
        assert_eq!(matches, vec!["session", "settings"]);
    }

    #[test]
    fn test_subcommands_complete_after_command() {
        let (start, matches) = candidates("session e", &names());
        assert_eq!(start, 8);
        assert_eq!(matches, vec!["edit", "end"]);
    }

    #[test]
    fn test_player_slots_complete_names() {
        let (start, matches) = candidates("session add b", &names());
        assert_eq!(start, 12);
        assert_eq!(matches, vec!["\"Big Al\"", "Bob"]);

        let (_, matches) = candidates("player delete al", &names());
        assert_eq!(matches, vec!["Alice"]);

        let (_, matches) = candidates("session start b", &names());
        assert!(matches.is_empty());
    }

    #[test]
    fn test_settings_set_completes_keys() {
        let (_, matches) = candidates("settings set payment_enabled=true paypal_m", &names());
        assert_eq!(matches, vec!["paypal_mode="]);
    }

    #[test]
    fn test_shared_names_reach_every_clone() {
        let helper = CliHelper::new();
        let editor_copy = helper.clone();
        helper.set_player_names(names());
        assert_eq!(editor_copy.names().len(), 3);
    }
}
