//! Rendering of monetary amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Largest single amount the ledger accepts. Keeps every sum far below the
/// `Decimal` range so aggregation cannot overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Rounds to cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded
}

/// Formats an amount with exactly two decimal places, e.g. `"12.50"`.
pub fn format_amount(amount: Decimal) -> String {
    round_cents(amount).to_string()
}

/// Formats an amount with a currency symbol, e.g. `"£12.50"` or `"-£3.00"`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let rounded = round_cents(amount);
    if rounded.is_sign_negative() {
        format!("-{symbol}{}", round_cents(rounded.abs()))
    } else {
        format!("{symbol}{rounded}")
    }
}

/// Converts an amount to the smallest currency unit (pence, cents).
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    (round_cents(amount) * Decimal::ONE_HUNDRED).to_i64()
}
