//! Stripe payment provider.
//!
//! A payment link is two calls: create a one-off price for the debt, then a
//! payment link selling one unit of it.

use crate::direct::DirectLinks;
use crate::http::{build_client, ensure_success, parse_json, request_error};
use crate::qr;
use async_trait::async_trait;
use pokerbook_core::config::AppConfig;
use pokerbook_core::money::to_minor_units;
use pokerbook_core::settlement::{LinkSource, PaymentLink, PaymentProvider, PaymentRequest};
use pokerbook_core::{LedgerError, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

const SERVICE: &str = "Stripe";
const API_BASE: &str = "https://api.stripe.com";
const THANK_YOU_URL: &str = "https://example.com/thank-you";

pub struct StripeProvider {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    links: DirectLinks,
}

impl StripeProvider {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = config
            .stripe_api_key
            .clone()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::info!("[Stripe] No API key; using pay-by-name links");
        }

        Ok(Self {
            client: build_client(SERVICE)?,
            api_base: API_BASE.to_string(),
            api_key,
            links: DirectLinks::from_config(config),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T> {
        let response = self
            .client
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(api_key)
            .form(form)
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;
        parse_json(SERVICE, ensure_success(SERVICE, response).await?).await
    }

    async fn create_checkout(&self, api_key: &str, request: &PaymentRequest) -> Result<String> {
        let price: IdResponse = self
            .post_form(api_key, "/v1/prices", &price_form(request, self.links.currency_code())?)
            .await?;

        let link: UrlResponse = self
            .post_form(api_key, "/v1/payment_links", &payment_link_form(&price.id))
            .await?;
        Ok(link.url)
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_payment_link(&self, request: &PaymentRequest) -> Result<Option<PaymentLink>> {
        let Some(api_key) = &self.api_key else {
            return Ok(self.links.pay_by_name(request.amount));
        };

        match self.create_checkout(api_key, request).await {
            Ok(url) => {
                tracing::info!("[Stripe] Created payment link for {}", request.payer_name);
                Ok(Some(PaymentLink::new(url, LinkSource::Provider)))
            }
            Err(e) => {
                tracing::warn!("[Stripe] Payment link failed, falling back: {}", e);
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

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UrlResponse {
    url: String,
}

fn price_form(request: &PaymentRequest, currency: &str) -> Result<Vec<(String, String)>> {
    let unit_amount = to_minor_units(request.amount)
        .filter(|pence| *pence > 0)
        .ok_or_else(|| LedgerError::validation("payment amount must be positive"))?;

    Ok(vec![
        ("currency".to_string(), currency.to_lowercase()),
        ("unit_amount".to_string(), unit_amount.to_string()),
        (
            "product_data[name]".to_string(),
            format!("Poker Debt: {}", request.payer_name),
        ),
        (
            "product_data[metadata][description]".to_string(),
            request.description.clone(),
        ),
    ])
}

fn payment_link_form(price_id: &str) -> Vec<(String, String)> {
    [
        ("line_items[0][price]", price_id),
        ("line_items[0][quantity]", "1"),
        ("after_completion[type]", "redirect"),
        ("after_completion[redirect][url]", THANK_YOU_URL),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
