use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Tolerance used when comparing independently recomputed amounts.
pub const CENT: Decimal = dec!(0.01);

/// Round to whole cents, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// True when two amounts agree within one cent.
pub fn within_cent(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= CENT
}

/// Format as dollars with thousands separators, e.g. `$12,345.60` or `-$400.00`.
pub fn display_amount(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let s = format!("{:.2}", rounded.abs());
    let (whole, frac) = s.split_once('.').unwrap_or((&s, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac}")
}
