//! Payment provider contract.

use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// What a provider is asked to collect from one debtor.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub description: String,
    /// Display name of the paying player
    pub payer_name: String,
}

/// How a payment link was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkSource {
    /// Checkout page created through the provider's API.
    Provider,
    /// Pay-by-name link (PayPal.me) built without any API call.
    PayByName,
    /// Plain bank-transfer instruction; not a URL.
    BankTransfer,
    /// Send-money link addressed to a recipient's email.
    EmailTransfer,
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkSource::Provider => "checkout",
            LinkSource::PayByName => "pay-by-name",
            LinkSource::BankTransfer => "bank transfer",
            LinkSource::EmailTransfer => "email transfer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentLink {
    /// URL, or a human-readable instruction for [`LinkSource::BankTransfer`]
    pub target: String,
    pub source: LinkSource,
}

impl PaymentLink {
    pub fn new(target: impl Into<String>, source: LinkSource) -> Self {
        Self {
            target: target.into(),
            source,
        }
    }

    pub fn is_url(&self) -> bool {
        self.source != LinkSource::BankTransfer
    }
}

/// A backend that produces payment links and their scannable codes.
///
/// Implementations never touch the ledger. A failed API call degrades to a
/// fallback link where one is configured; `Ok(None)` means nothing could be
/// produced at all.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Short backend name for logs and notices.
    fn name(&self) -> &'static str;

    /// Creates a link a debtor can use to pay.
    async fn create_payment_link(&self, request: &PaymentRequest) -> Result<Option<PaymentLink>>;

    /// Creates a link the host can use to send winnings to `recipient_email`.
    async fn create_transfer_link(
        &self,
        amount: Decimal,
        recipient_email: &str,
        description: &str,
    ) -> Result<Option<PaymentLink>>;

    /// Renders `content` as a PNG QR code.
    fn render_code(&self, content: &str) -> Result<Vec<u8>>;
}
