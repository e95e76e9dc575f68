//! Order amount arithmetic, all in `Decimal`.

use rust_decimal::Decimal;

/// Total for one order line: `price * quantity * (1 - discount_percent/100)`.
///
/// `discount_percent` is a whole-number percentage (0–100). No per-line
/// rounding is applied; rounding happens once at the subtotal.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32, discount_percent: i16) -> Decimal {
    let multiplier = Decimal::ONE - Decimal::from(discount_percent) / Decimal::ONE_HUNDRED;
    unit_price * Decimal::from(quantity) * multiplier
}

/// Sum of line totals, rounded to 2 decimal places (banker-free, half-up).
#[must_use]
pub fn subtotal(line_totals: &[Decimal]) -> Decimal {
    let sum: Decimal = line_totals.iter().copied().sum();
    sum.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}
