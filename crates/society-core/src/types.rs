use rust_decimal::{Decimal, RoundingStrategy};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Interest rates expressed as annual percentages (12 = 12% p.a.).
pub type Rate = Decimal;

/// Round a monetary value to 2 decimal places, half-up.
///
/// Every persisted monetary value passes through this helper so that
/// schedules, ledger entries, and derived totals share one precision policy.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
