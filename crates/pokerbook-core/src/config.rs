//! Application configuration.
//!
//! The configuration document is a flat JSON object. Every key is optional and
//! falls back to the default below, so an old or hand-written file keeps
//! loading as new keys are added.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_PAYPAL_CLIENT_ID: &str = "PAYPAL_CLIENT_ID";
pub const ENV_PAYPAL_SECRET: &str = "PAYPAL_SECRET";
pub const ENV_STRIPE_API_KEY: &str = "STRIPE_API_KEY";
pub const ENV_GOOGLE_SHEET_NAME: &str = "GOOGLE_SHEET_NAME";
pub const ENV_GOOGLE_CREDENTIALS_FILE: &str = "GOOGLE_CREDENTIALS_FILE";

/// Keys accepted by [`AppConfig::set`], in display order.
pub const SETTING_KEYS: &[&str] = &[
    "app_name",
    "data_file",
    "currency_symbol",
    "currency_code",
    "payment_enabled",
    "payment_provider",
    "paypal_client_id",
    "paypal_client_secret",
    "paypal_mode",
    "paypal_username",
    "bank_account_name",
    "stripe_api_key",
    "google_sheet_name",
    "google_credentials_file",
];

const SECRET_KEYS: &[&str] = &["paypal_client_secret", "stripe_api_key"];

/// Which settlement backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentBackendKind {
    #[default]
    Paypal,
    Stripe,
    /// No API calls; pay-by-name and bank-transfer links only.
    Direct,
}

impl fmt::Display for PaymentBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentBackendKind::Paypal => f.write_str("paypal"),
            PaymentBackendKind::Stripe => f.write_str("stripe"),
            PaymentBackendKind::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for PaymentBackendKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "paypal" => Ok(PaymentBackendKind::Paypal),
            "stripe" => Ok(PaymentBackendKind::Stripe),
            "direct" => Ok(PaymentBackendKind::Direct),
            other => Err(LedgerError::validation(format!(
                "unknown payment provider '{other}'; use paypal, stripe or direct"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayPalMode {
    #[default]
    Sandbox,
    Live,
}

impl fmt::Display for PayPalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayPalMode::Sandbox => f.write_str("sandbox"),
            PayPalMode::Live => f.write_str("live"),
        }
    }
}

impl FromStr for PayPalMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(PayPalMode::Sandbox),
            "live" => Ok(PayPalMode::Live),
            other => Err(LedgerError::validation(format!(
                "unknown PayPal mode '{other}'; use sandbox or live"
            ))),
        }
    }
}

impl PayPalMode {
    /// Base URL of the PayPal REST API for this mode.
    pub fn api_base(&self) -> &'static str {
        match self {
            PayPalMode::Sandbox => "https://api-m.sandbox.paypal.com",
            PayPalMode::Live => "https://api-m.paypal.com",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    /// Ledger file; `None` means `<data dir>/poker_data.json`
    pub data_file: Option<PathBuf>,
    /// Service-account key file for the spreadsheet sync
    pub google_credentials_file: Option<PathBuf>,
    pub google_sheet_name: Option<String>,
    pub accent_color: String,
    pub currency_symbol: String,
    /// ISO 4217 code sent to payment providers
    pub currency_code: String,
    pub payment_enabled: bool,
    pub payment_provider: PaymentBackendKind,
    pub paypal_client_id: Option<String>,
    pub paypal_client_secret: Option<String>,
    pub paypal_mode: PayPalMode,
    /// PayPal.me handle used for pay-by-name links
    pub paypal_username: Option<String>,
    pub bank_account_name: Option<String>,
    pub stripe_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Poker Tracker".to_string(),
            data_file: None,
            google_credentials_file: None,
            google_sheet_name: None,
            accent_color: "#1f538d".to_string(),
            currency_symbol: "£".to_string(),
            currency_code: "GBP".to_string(),
            payment_enabled: false,
            payment_provider: PaymentBackendKind::default(),
            paypal_client_id: None,
            paypal_client_secret: None,
            paypal_mode: PayPalMode::default(),
            paypal_username: None,
            bank_account_name: None,
            stripe_api_key: None,
        }
    }
}

impl AppConfig {
    /// Overrides secrets and sheet settings from the environment.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`. Empty values are
    /// ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_PAYPAL_CLIENT_ID) {
            self.paypal_client_id = Some(value);
        }
        if let Some(value) = get(ENV_PAYPAL_SECRET) {
            self.paypal_client_secret = Some(value);
        }
        if let Some(value) = get(ENV_STRIPE_API_KEY) {
            self.stripe_api_key = Some(value);
        }
        if let Some(value) = get(ENV_GOOGLE_SHEET_NAME) {
            self.google_sheet_name = Some(value);
        }
        if let Some(value) = get(ENV_GOOGLE_CREDENTIALS_FILE) {
            self.google_credentials_file = Some(PathBuf::from(value));
        }
    }

    /// Sets one key from user input. An empty value clears an optional key.
    ///
    /// # Errors
    ///
    /// `Validation` for an unknown key or a value that does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let optional = || (!value.is_empty()).then(|| value.to_string());
        let required = |key: &str| {
            if value.is_empty() {
                Err(LedgerError::validation(format!("{key} cannot be empty")))
            } else {
                Ok(value.to_string())
            }
        };

        match key {
            "app_name" => self.app_name = required(key)?,
            "data_file" => self.data_file = optional().map(PathBuf::from),
            "currency_symbol" => self.currency_symbol = required(key)?,
            "currency_code" => self.currency_code = required(key)?.to_uppercase(),
            "payment_enabled" => self.payment_enabled = parse_flag(value)?,
            "payment_provider" => self.payment_provider = value.parse()?,
            "paypal_client_id" => self.paypal_client_id = optional(),
            "paypal_client_secret" => self.paypal_client_secret = optional(),
            "paypal_mode" => self.paypal_mode = value.parse()?,
            "paypal_username" => self.paypal_username = optional(),
            "bank_account_name" => self.bank_account_name = optional(),
            "stripe_api_key" => self.stripe_api_key = optional(),
            "google_sheet_name" => self.google_sheet_name = optional(),
            "google_credentials_file" => {
                self.google_credentials_file = optional().map(PathBuf::from)
            }
            other => {
                return Err(LedgerError::validation(format!(
                    "unknown setting '{other}'"
                )));
            }
        }
        Ok(())
    }

    /// Every settable key with its current value. Secrets are masked.
    pub fn settings(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let path = |value: &Option<PathBuf>| {
            value
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        SETTING_KEYS
            .iter()
            .map(|&key| {
                let value = match key {
                    "app_name" => self.app_name.clone(),
                    "data_file" => path(&self.data_file),
                    "currency_symbol" => self.currency_symbol.clone(),
                    "currency_code" => self.currency_code.clone(),
                    "payment_enabled" => self.payment_enabled.to_string(),
                    "payment_provider" => self.payment_provider.to_string(),
                    "paypal_client_id" => text(&self.paypal_client_id),
                    "paypal_client_secret" => text(&self.paypal_client_secret),
                    "paypal_mode" => self.paypal_mode.to_string(),
                    "paypal_username" => text(&self.paypal_username),
                    "bank_account_name" => text(&self.bank_account_name),
                    "stripe_api_key" => text(&self.stripe_api_key),
                    "google_sheet_name" => text(&self.google_sheet_name),
                    "google_credentials_file" => path(&self.google_credentials_file),
                    _ => String::new(),
                };
                let value = if SECRET_KEYS.contains(&key) && !value.is_empty() {
                    "********".to_string()
                } else {
                    value
                };
                (key, value)
            })
            .collect()
    }

    /// Both PayPal API credentials are present and non-empty.
    pub fn has_paypal_credentials(&self) -> bool {
        non_blank(&self.paypal_client_id) && non_blank(&self.paypal_client_secret)
    }

    pub fn has_stripe_key(&self) -> bool {
        non_blank(&self.stripe_api_key)
    }

    /// Whether the spreadsheet sync has everything it needs.
    pub fn sheet_sync_configured(&self) -> bool {
        self.google_credentials_file.is_some() && non_blank(&self.google_sheet_name)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(LedgerError::validation(format!(
            "'{other}' is not true or false"
        ))),
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
