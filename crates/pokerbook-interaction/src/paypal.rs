//! PayPal REST payment provider.
//!
//! Creates a checkout with the classic payments API and hands back its
//! approval URL. Without credentials, or when any call fails, it falls back to
//! the pay-by-name link.

use crate::direct::DirectLinks;
use crate::http::{build_client, ensure_success, parse_json, request_error};
use crate::qr;
use async_trait::async_trait;
use pokerbook_core::config::AppConfig;
use pokerbook_core::money::format_amount;
use pokerbook_core::settlement::{LinkSource, PaymentLink, PaymentProvider, PaymentRequest};
use pokerbook_core::{LedgerError, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "PayPal";
const RETURN_URL: &str = "https://example.com/payment/success";
const CANCEL_URL: &str = "https://example.com/payment/cancel";

struct Credentials {
    client_id: String,
    secret: String,
}

pub struct PayPalProvider {
    client: Client,
    api_base: String,
    credentials: Option<Credentials>,
    links: DirectLinks,
}

impl PayPalProvider {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let credentials = if config.has_paypal_credentials() {
            Some(Credentials {
                client_id: config.paypal_client_id.clone().unwrap_or_default(),
                secret: config.paypal_client_secret.clone().unwrap_or_default(),
            })
        } else {
            tracing::info!("[PayPal] No API credentials; using pay-by-name links");
            None
        };

        Ok(Self {
            client: build_client(SERVICE)?,
            api_base: config.paypal_mode.api_base().to_string(),
            credentials,
            links: DirectLinks::from_config(config),
        })
    }

    /// Points the provider at a different API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn access_token(&self, credentials: &Credentials) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&credentials.client_id, Some(&credentials.secret))
            .header("Accept", "application/json")
            .header("Accept-Language", "en_US")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let token: TokenResponse = parse_json(SERVICE, ensure_success(SERVICE, response).await?).await?;
        tracing::debug!("[PayPal] Authenticated, token type {}", token.token_type);
        Ok(token.access_token)
    }

    async fn create_checkout(
        &self,
        credentials: &Credentials,
        request: &PaymentRequest,
    ) -> Result<String> {
        let token = self.access_token(credentials).await?;
        let body = payment_body(request, self.links.currency_code());

        let response = self
            .client
            .post(format!("{}/v1/payments/payment", self.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let created: PaymentResponse = parse_json(SERVICE, ensure_success(SERVICE, response).await?).await?;
        tracing::debug!("[PayPal] Payment created with id {}", created.id);

        created
            .links
            .into_iter()
            .find(|link| link.rel == "approval_url")
            .map(|link| link.href)
            .ok_or_else(|| LedgerError::external(SERVICE, "no approval URL in payment response"))
    }
}

#[async_trait]
impl PaymentProvider for PayPalProvider {
    fn name(&self) -> &'static str {
        "paypal"
    }

    async fn create_payment_link(&self, request: &PaymentRequest) -> Result<Option<PaymentLink>> {
        let Some(credentials) = &self.credentials else {
            return Ok(self.links.pay_by_name(request.amount));
        };

        match self.create_checkout(credentials, request).await {
            Ok(url) => {
                tracing::info!("[PayPal] Created checkout for {}", request.payer_name);
                Ok(Some(PaymentLink::new(url, LinkSource::Provider)))
            }
            Err(e) => {
                tracing::warn!("[PayPal] Checkout failed, falling back: {}", e);
                Ok(self.links.pay_by_name(request.amount))
            }
        }
    }

    async fn create_transfer_link(
        &self,
        amount: Decimal,
        recipient_email: &str,
        description: &str,
    ) -> Result<Option<PaymentLink>> {
        self.links
            .email_transfer(amount, recipient_email, description)
            .map(Some)
    }

    fn render_code(&self, content: &str) -> Result<Vec<u8>> {
        qr::render_png(content)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    links: Vec<ResponseLink>,
}

#[derive(Debug, Deserialize)]
struct ResponseLink {
    href: String,
    rel: String,
}

#[derive(Debug, Serialize)]
struct PaymentBody {
    intent: &'static str,
    payer: Payer,
    redirect_urls: RedirectUrls,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
struct Payer {
    payment_method: &'static str,
}

#[derive(Debug, Serialize)]
struct RedirectUrls {
    return_url: &'static str,
    cancel_url: &'static str,
}

#[derive(Debug, Serialize)]
struct Transaction {
    item_list: ItemList,
    amount: Amount,
    description: String,
}

#[derive(Debug, Serialize)]
struct ItemList {
    items: Vec<Item>,
}

#[derive(Debug, Serialize)]
struct Item {
    name: String,
    description: String,
    quantity: &'static str,
    price: String,
    currency: String,
}

#[derive(Debug, Serialize)]
struct Amount {
    total: String,
    currency: String,
}

fn payment_body(request: &PaymentRequest, currency: &str) -> PaymentBody {
    let amount = format_amount(request.amount);
    PaymentBody {
        intent: "sale",
        payer: Payer {
            payment_method: "paypal",
        },
        redirect_urls: RedirectUrls {
            return_url: RETURN_URL,
            cancel_url: CANCEL_URL,
        },
        transactions: vec![Transaction {
            item_list: ItemList {
                items: vec![Item {
                    name: format!("Poker Debt: {}", request.payer_name),
                    description: request.description.clone(),
                    quantity: "1",
                    price: amount.clone(),
                    currency: currency.to_string(),
                }],
            },
            amount: Amount {
                total: amount,
                currency: currency.to_string(),
            },
            description: request.description.clone(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> PaymentRequest {
        PaymentRequest {
            amount: dec!(15),
            description: "Payment for Friday on 2024-02-09".to_string(),
            payer_name: "Bob".to_string(),
        }
    }

    #[test]
    fn test_payment_body_shape() {
        let body = serde_json::to_value(payment_body(&request(), "GBP")).unwrap();
        assert_eq!(body["intent"], "sale");
        assert_eq!(body["redirect_urls"]["return_url"], RETURN_URL);
        let tx = &body["transactions"][0];
        assert_eq!(tx["amount"]["total"], "15.00");
        assert_eq!(tx["amount"]["currency"], "GBP");
        assert_eq!(tx["item_list"]["items"][0]["name"], "Poker Debt: Bob");
        assert_eq!(tx["description"], "Payment for Friday on 2024-02-09");
    }

    #[tokio::test]
    async fn test_without_credentials_uses_pay_by_name() {
        let config = AppConfig {
            paypal_username: Some("Host".to_string()),
            ..AppConfig::default()
        };
        let provider = PayPalProvider::from_config(&config).unwrap();
        let link = provider.create_payment_link(&request()).await.unwrap().unwrap();
        assert_eq!(link.source, LinkSource::PayByName);
        assert_eq!(link.target, "https://www.paypal.com/paypalme/Host/15.00");
    }

    #[tokio::test]
    async fn test_api_failure_falls_back() {
        let config = AppConfig {
            paypal_client_id: Some("id".to_string()),
            paypal_client_secret: Some("secret".to_string()),
            bank_account_name: Some("Host Bank".to_string()),
            ..AppConfig::default()
        };
        let provider = PayPalProvider::from_config(&config)
            .unwrap()
            .with_api_base("http://127.0.0.1:9");

        let link = provider.create_payment_link(&request()).await.unwrap().unwrap();
        assert_eq!(link.source, LinkSource::BankTransfer);
        assert_eq!(link.target, "Bank transfer to Host Bank - Amount: £15.00");
    }
}
