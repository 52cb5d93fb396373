//! Monetary formatting for hash input and XML.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to exactly two decimals, half away from zero.
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount the way the protocol expects it: two decimals, `.` as
/// separator, no thousands separator.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_amount(value);
    // Keeps "-0.00" out of the output.
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded.to_string()
}
