//! Adapters to remote services: payment providers and the spreadsheet backend.

pub mod direct;
pub mod google_auth;
pub mod google_sheets;
mod http;
pub mod paypal;
pub mod qr;
pub mod stripe;

pub use direct::{DirectLinks, DirectProvider};
pub use google_sheets::GoogleSheetsBackend;
pub use paypal::PayPalProvider;
pub use stripe::StripeProvider;

use pokerbook_core::Result;
use pokerbook_core::config::{AppConfig, PaymentBackendKind};
use pokerbook_core::settlement::PaymentProvider;
use std::sync::Arc;

/// Builds the payment backend selected in `config`.
///
/// With payments disabled the direct provider is returned, so transfer links
/// and pay-by-name links keep working without any API.
pub fn build_payment_provider(config: &AppConfig) -> Result<Arc<dyn PaymentProvider>> {
    let kind = if config.payment_enabled {
        config.payment_provider
    } else {
        PaymentBackendKind::Direct
    };
    tracing::info!("[Settlement] Using {} payment backend", kind);

    Ok(match kind {
        PaymentBackendKind::Paypal => Arc::new(PayPalProvider::from_config(config)?),
        PaymentBackendKind::Stripe => Arc::new(StripeProvider::from_config(config)?),
        PaymentBackendKind::Direct => Arc::new(DirectProvider::new(DirectLinks::from_config(config))),
    })
}
