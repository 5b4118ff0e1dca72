//! Unified path management for pokerbook files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/pokerbook/          # Config directory
//! ├── config.json               # Application configuration
//! └── logs/                     # Application logs
//!     └── pokerbook.log.YYYY-MM-DD
//!
//! ~/.local/share/pokerbook/     # Data directory
//! ├── poker_data.json           # The ledger
//! └── qr_codes/                 # Rendered settlement QR codes
//! ```

use pokerbook_core::{LedgerError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "pokerbook";

/// Environment variable that points at an alternative config file.
pub const ENV_CONFIG_PATH: &str = "POKERBOOK_CONFIG";

pub struct PokerbookPaths;

impl PokerbookPaths {
    /// Returns the pokerbook configuration directory (e.g. `~/.config/pokerbook/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| LedgerError::config("Cannot find config directory"))
    }

    /// Returns the pokerbook data directory (e.g. `~/.local/share/pokerbook/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| LedgerError::config("Cannot find data directory"))
    }

    /// Path to the configuration file, honouring `POKERBOOK_CONFIG`.
    pub fn config_file<F>(lookup: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(ENV_CONFIG_PATH).filter(|v| !v.trim().is_empty()) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(Self::config_dir()?.join("config.json")),
        }
    }

    /// Default location of the ledger when the config does not name one.
    pub fn default_data_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("poker_data.json"))
    }

    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }

    pub fn qr_codes_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("qr_codes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_env_override() {
        let path = PokerbookPaths::config_file(|key| {
            (key == ENV_CONFIG_PATH).then(|| "/tmp/custom.json".to_string())
        })
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn test_default_file_names() {
        if let Ok(path) = PokerbookPaths::default_data_file() {
            assert!(path.ends_with("pokerbook/poker_data.json"));
        }
        if let Ok(path) = PokerbookPaths::config_file(|_| None) {
            assert!(path.ends_with("pokerbook/config.json"));
        }
    }
}
