//! Settlement service.
//!
//! Turns the outcome of a session into one ticket per player: who pays or is
//! paid, how much, the link to do it, and a QR code of that link.

use anyhow::{Context, Result};
use futures::future::join_all;
use pokerbook_core::config::AppConfig;
use pokerbook_core::money::format_currency;
use pokerbook_core::settlement::{
    PaymentLink, PaymentProvider, PaymentRequest, SettlementDirection, SettlementEntry,
    payment_description, plan_settlement,
};
use pokerbook_core::{Player, Session};
use pokerbook_interaction::build_payment_provider;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One player's part of a settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementTicket {
    pub entry: SettlementEntry,
    pub direction: SettlementDirection,
    pub link: Option<PaymentLink>,
    /// PNG QR code of the link, for links that are URLs
    pub qr_png: Option<Vec<u8>>,
    /// Why there is no link, when there is none
    pub note: Option<String>,
}

impl SettlementTicket {
    /// `"Bob owes £5.00"` or `"Alice wins £5.00"`.
    pub fn headline(&self, currency_symbol: &str) -> String {
        let verb = match self.direction {
            SettlementDirection::Collect => "owes",
            SettlementDirection::Distribute => "wins",
        };
        format!(
            "{} {} {}",
            self.entry.name,
            verb,
            format_currency(self.entry.amount, currency_symbol)
        )
    }

    /// Writes the QR code into `dir` and returns its path.
    pub fn save_code(&self, dir: &Path, session: &Session) -> Result<Option<PathBuf>> {
        let Some(png) = &self.qr_png else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(code_file_name(session, self));
        std::fs::write(&path, png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(path))
    }
}

pub struct SettlementService {
    provider: Arc<dyn PaymentProvider>,
}

impl SettlementService {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider =
            build_payment_provider(config).context("Failed to set up the payment backend")?;
        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Builds the tickets for one side of `session`.
    ///
    /// Links are requested concurrently. A failure for one player is recorded
    /// on that player's ticket and does not stop the others.
    pub async fn prepare(
        &self,
        session: &Session,
        players: &[Player],
        direction: SettlementDirection,
    ) -> Vec<SettlementTicket> {
        let plan = plan_settlement(session, players);
        let description = payment_description(session, direction);

        let tickets = join_all(
            plan.entries(direction)
                .iter()
                .map(|entry| self.ticket(entry.clone(), direction, &description)),
        )
        .await;

        tracing::info!(
            "[Settlement] Prepared {} {} tickets for '{}' via {}",
            tickets.len(),
            direction,
            session.name,
            self.provider.name()
        );
        tickets
    }

    async fn ticket(
        &self,
        entry: SettlementEntry,
        direction: SettlementDirection,
        description: &str,
    ) -> SettlementTicket {
        let outcome = match (direction, entry.email.as_deref()) {
            (SettlementDirection::Collect, _) => {
                let request = PaymentRequest {
                    amount: entry.amount,
                    description: description.to_string(),
                    payer_name: entry.name.clone(),
                };
                self.provider.create_payment_link(&request).await
            }
            (SettlementDirection::Distribute, Some(email)) => {
                self.provider
                    .create_transfer_link(entry.amount, email, description)
                    .await
            }
            (SettlementDirection::Distribute, None) => {
                return SettlementTicket {
                    entry,
                    direction,
                    link: None,
                    qr_png: None,
                    note: Some("no email on file; add one with 'player edit'".to_string()),
                };
            }
        };

        let (link, note) = match outcome {
            Ok(Some(link)) => (Some(link), None),
            Ok(None) => (
                None,
                Some("no payment method configured; set paypal_username or bank_account_name".to_string()),
            ),
            Err(e) => {
                tracing::warn!("[Settlement] Link for {} failed: {}", entry.name, e);
                (None, Some(e.to_string()))
            }
        };

        let qr_png = match link.as_ref().filter(|l| l.is_url()) {
            Some(link) => match self.provider.render_code(&link.target) {
                Ok(png) => Some(png),
                Err(e) => {
                    tracing::warn!("[Settlement] QR code for {} failed: {}", entry.name, e);
                    None
                }
            },
            None => None,
        };

        SettlementTicket {
            entry,
            direction,
            link,
            qr_png,
            note,
        }
    }
}

fn code_file_name(session: &Session, ticket: &SettlementTicket) -> String {
    format!(
        "{}-{}-{}-{}.png",
        session.day(),
        slug(&session.name),
        ticket.direction,
        slug(&ticket.entry.name)
    )
}

fn slug(text: &str) -> String {
    let slug: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}
