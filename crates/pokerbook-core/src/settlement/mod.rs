//! Settlement of a finished session.
//!
//! Planning decides who owes and who is owed. The provider contract turns one
//! entry of a plan into a payment link and a scannable code.

pub mod plan;
pub mod provider;

pub use plan::{
    SettlementDirection, SettlementEntry, SettlementPlan, payment_description, plan_settlement,
};
pub use provider::{LinkSource, PaymentLink, PaymentProvider, PaymentRequest};
