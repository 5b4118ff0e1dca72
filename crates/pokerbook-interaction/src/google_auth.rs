//! Google service-account authentication.
//!
//! Exchanges a self-signed RS256 assertion for a short-lived OAuth access
//! token and caches it until shortly before it expires.

use crate::http::{ensure_success, parse_json, request_error};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use pokerbook_core::{LedgerError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

const SERVICE: &str = "Google auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service-account key file that the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            LedgerError::config(format!("invalid service-account credentials: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::config(format!(
                "cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct GoogleAuth {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    /// Fails early if the private key is not a valid RSA PEM.
    pub fn new(client: Client, key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| LedgerError::config(format!("invalid service-account private key: {e}")))?;
        Ok(Self {
            client,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Returns a valid access token, fetching a new one when needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > now) {
            return Ok(token.value.clone());
        }

        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;
        let token: TokenResponse = parse_json(SERVICE, ensure_success(SERVICE, response).await?).await?;

        tracing::debug!(
            "[GoogleAuth] Obtained access token for {}, valid {}s",
            self.key.client_email,
            token.expires_in
        );
        let expires_at = now + Duration::seconds((token.expires_in - EXPIRY_MARGIN_SECS).max(0));
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| LedgerError::external(SERVICE, format!("failed to sign assertion: {e}")))
    }
}
