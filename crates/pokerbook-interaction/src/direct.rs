//! Payment links that need no API call.
//!
//! These links double as the fallback of the API-backed providers.

use crate::qr;
use async_trait::async_trait;
use pokerbook_core::config::AppConfig;
use pokerbook_core::money::{format_amount, format_currency};
use pokerbook_core::settlement::{LinkSource, PaymentLink, PaymentProvider, PaymentRequest};
use pokerbook_core::{LedgerError, Result};
use rust_decimal::Decimal;
use url::Url;

const PAYPAL_ME_BASE: &str = "https://www.paypal.com/paypalme";
const PAYPAL_SEND_MONEY: &str = "https://www.paypal.com/myaccount/transfer/send";
const DEFAULT_TRANSFER_NOTE: &str = "Poker winnings";

/// Builder for pay-by-name, bank-transfer and email-transfer links.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectLinks {
    paypal_username: Option<String>,
    bank_account_name: Option<String>,
    currency_symbol: String,
    currency_code: String,
}

impl DirectLinks {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            paypal_username: non_blank(config.paypal_username.as_deref()),
            bank_account_name: non_blank(config.bank_account_name.as_deref()),
            currency_symbol: config.currency_symbol.clone(),
            currency_code: config.currency_code.clone(),
        }
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// PayPal.me link when a username is configured, otherwise a bank-transfer
    /// instruction. `None` when neither is configured.
    pub fn pay_by_name(&self, amount: Decimal) -> Option<PaymentLink> {
        if let Some(username) = &self.paypal_username {
            let handle: String = username.chars().filter(|c| !c.is_whitespace()).collect();
            let target = format!("{PAYPAL_ME_BASE}/{handle}/{}", format_amount(amount));
            return Some(PaymentLink::new(target, LinkSource::PayByName));
        }

        self.bank_account_name.as_ref().map(|bank| {
            PaymentLink::new(
                format!(
                    "Bank transfer to {bank} - Amount: {}",
                    format_currency(amount, &self.currency_symbol)
                ),
                LinkSource::BankTransfer,
            )
        })
    }

    /// PayPal send-money link addressed to `recipient_email`.
    pub fn email_transfer(
        &self,
        amount: Decimal,
        recipient_email: &str,
        description: &str,
    ) -> Result<PaymentLink> {
        let recipient = recipient_email.trim();
        if recipient.is_empty() {
            return Err(LedgerError::validation("recipient email is required"));
        }
        let note = if description.trim().is_empty() {
            DEFAULT_TRANSFER_NOTE
        } else {
            description
        };

        let mut url = Url::parse(PAYPAL_SEND_MONEY)
            .map_err(|e| LedgerError::external("PayPal", e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("amount", &format_amount(amount))
            .append_pair("currencyCode", &self.currency_code)
            .append_pair("recipient", recipient)
            .append_pair("note", note);

        Ok(PaymentLink::new(url.to_string(), LinkSource::EmailTransfer))
    }
}

/// Provider that never calls an API.
pub struct DirectProvider {
    links: DirectLinks,
}

impl DirectProvider {
    pub fn new(links: DirectLinks) -> Self {
        Self { links }
    }
}

#[async_trait]
impl PaymentProvider for DirectProvider {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn create_payment_link(&self, request: &PaymentRequest) -> Result<Option<PaymentLink>> {
        Ok(self.links.pay_by_name(request.amount))
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

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
