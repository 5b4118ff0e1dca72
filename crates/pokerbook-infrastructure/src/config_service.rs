//! Configuration service implementation.
//!
//! Loads the application configuration from `config.json`, creating the file
//! with defaults when it is missing, and caches the result. Edits made from
//! the REPL are written back through [`ConfigService::update_config`].

use crate::paths::PokerbookPaths;
use crate::storage::AtomicJsonFile;
use pokerbook_core::Result;
use pokerbook_core::config::AppConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loads and caches the application configuration.
///
/// Environment overrides are applied on every load, after the file, and are
/// never written back to disk.
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    lookup: EnvLookup,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Uses the default config location and the process environment.
    pub fn from_env() -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let path = PokerbookPaths::config_file(lookup)?;
        Ok(Self::with_lookup(path, lookup))
    }

    pub fn with_lookup<F>(path: PathBuf, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            path,
            lookup: Arc::new(lookup),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<AppConfig> {
        if let Ok(guard) = self.config.read() {
            if let Some(cached) = guard.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;
        if let Ok(mut guard) = self.config.write() {
            *guard = Some(loaded.clone());
        }
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut guard) = self.config.write() {
            *guard = None;
        }
    }

    /// Writes `config` to disk as-is and drops the cached copy.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        AtomicJsonFile::<AppConfig>::new(self.path.clone()).replace(config)?;
        self.invalidate_cache();
        tracing::info!("[Config] Saved configuration to {}", self.path.display());
        Ok(())
    }

    /// Applies `edit` to the document on disk, saves it, and returns the
    /// reloaded configuration with environment overrides applied.
    ///
    /// The edit sees the file contents only, so values that came from the
    /// environment are never persisted. Nothing is written if `edit` fails.
    pub fn update_config<F>(&self, edit: F) -> Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig) -> Result<()>,
    {
        let file = AtomicJsonFile::<AppConfig>::new(self.path.clone());
        let mut stored = file.load()?.unwrap_or_default();
        edit(&mut stored)?;
        self.save_config(&stored)?;
        self.get_config()
    }

    /// Ledger file from the config, or the default location.
    pub fn data_file(&self) -> Result<PathBuf> {
        match self.get_config()?.data_file {
            Some(path) => Ok(path),
            None => PokerbookPaths::default_data_file(),
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let file = AtomicJsonFile::<AppConfig>::new(self.path.clone());
        let mut config = match file.load()? {
            Some(config) => config,
            None => {
                let defaults = AppConfig::default();
                file.replace(&defaults)?;
                tracing::info!(
                    "[Config] Created default configuration at {}",
                    self.path.display()
                );
                defaults
            }
        };

        config.apply_env_overrides(|key| (self.lookup)(key));
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokerbook_core::config::PaymentBackendKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let service = ConfigService::with_lookup(path.clone(), |_| None);

        let config = service.get_config().unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_file_values_and_env_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"payment_enabled": true, "payment_provider": "direct",
                "paypal_username": "Host Name", "data_file": "/tmp/ledger.json"}"#,
        )
        .unwrap();

        let service = ConfigService::with_lookup(path.clone(), |key| {
            (key == "PAYPAL_SECRET").then(|| "from-env".to_string())
        });
        let config = service.get_config().unwrap();

        assert!(config.payment_enabled);
        assert_eq!(config.payment_provider, PaymentBackendKind::Direct);
        assert_eq!(config.paypal_client_secret.as_deref(), Some("from-env"));
        assert_eq!(service.data_file().unwrap(), PathBuf::from("/tmp/ledger.json"));

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("from-env"));
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let service = ConfigService::with_lookup(path.clone(), |_| None);
        assert_eq!(service.get_config().unwrap().app_name, "Poker Tracker");

        std::fs::write(&path, r#"{"app_name": "Tuesday Club"}"#).unwrap();
        assert_eq!(service.get_config().unwrap().app_name, "Poker Tracker");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().app_name, "Tuesday Club");
    }

    #[test]
    fn test_update_config_persists_and_refreshes_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let service = ConfigService::with_lookup(path.clone(), |_| None);
        assert!(!service.get_config().unwrap().payment_enabled);

        let updated = service
            .update_config(|config| {
                config.set("payment_enabled", "true")?;
                config.set("paypal_client_id", "client-123")?;
                config.set("bank_account_name", "Host Account")
            })
            .unwrap();
        assert!(updated.payment_enabled);
        assert_eq!(service.get_config().unwrap(), updated);

        let reopened = ConfigService::with_lookup(path, |_| None);
        let config = reopened.get_config().unwrap();
        assert_eq!(config.paypal_client_id.as_deref(), Some("client-123"));
        assert_eq!(config.bank_account_name.as_deref(), Some("Host Account"));
    }

    #[test]
    fn test_update_config_keeps_env_values_off_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let service = ConfigService::with_lookup(path.clone(), |key| {
            (key == "STRIPE_API_KEY").then(|| "sk_env".to_string())
        });

        let updated = service
            .update_config(|config| config.set("payment_provider", "stripe"))
            .unwrap();
        assert_eq!(updated.payment_provider, PaymentBackendKind::Stripe);
        assert_eq!(updated.stripe_api_key.as_deref(), Some("sk_env"));

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("stripe"));
        assert!(!on_disk.contains("sk_env"));
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let service = ConfigService::with_lookup(path.clone(), |_| None);
        service.get_config().unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = service
            .update_config(|config| {
                config.set("app_name", "Tuesday Club")?;
                config.set("payment_enabled", "perhaps")
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(service.get_config().unwrap().app_name, "Poker Tracker");
    }
}
