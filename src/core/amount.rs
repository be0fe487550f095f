//! Monetary formatting for `InstdAmt` and `CtrlSum`.

use rust_decimal::{Decimal, RoundingStrategy};

use super::variant::Pain001Variant;

/// Round half-even to two decimals, the value written as `InstdAmt`.
pub fn round_amount(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

/// Round half-even to two decimals and format with a decimal point and no
/// grouping (`"1234.50"`).
pub fn format_amount(amount: Decimal) -> String {
    round_amount(amount).to_string()
}

/// Whether `amount` respects the variant's upper bound.
pub fn within_cap(amount: Decimal, variant: Pain001Variant) -> bool {
    variant
        .strategy()
        .amount_cap
        .is_none_or(|cap| amount <= cap)
}

/// Sum of the rounded amounts. Equals the sum of the `InstdAmt` values
/// written for the same payments.
pub fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().map(round_amount).sum()
}

/// [`sum_amounts`], formatted for `CtrlSum`.
pub fn format_sum<I>(amounts: I) -> String
where
    I: IntoIterator<Item = Decimal>,
{
    format_amount(sum_amounts(amounts))
}
