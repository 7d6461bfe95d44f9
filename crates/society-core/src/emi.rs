use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SocietyError;
use crate::types::{round_money, Money, Rate};
use crate::SocietyResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Status of a single scheduled repayment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
}

impl std::str::FromStr for InstallmentStatus {
    type Err = SocietyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(InstallmentStatus::Pending),
            "paid" => Ok(InstallmentStatus::Paid),
            other => Err(SocietyError::invalid(
                "status",
                &format!("invalid installment status '{other}', expected paid or pending"),
            )),
        }
    }
}

/// One scheduled EMI: amount, due date, paid/pending flag. Identified by its
/// index within the owning loan's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub amount: Money,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
}

/// Result of an EMI computation: the level installment, the rounded total
/// payable, and the full amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiSchedule {
    pub emi_amount: Money,
    pub total_payable: Money,
    pub installments: Vec<Installment>,
}

/// Compute the level monthly installment and repayment schedule.
///
/// `EMI = P * r * (1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate derived
/// from the annual percentage rate. Due dates advance by calendar months from
/// `start_date` (day-of-month clamps at month end, e.g. Jan 31 -> Feb 28).
///
/// The rounded schedule sums exactly to `total_payable`: every installment
/// carries the rounded EMI except the last, which absorbs the remainder.
///
/// Pure function; safe to call repeatedly and in parallel.
pub fn compute_schedule(
    principal: Money,
    annual_rate_percent: Rate,
    months: u32,
    start_date: NaiveDate,
) -> SocietyResult<EmiSchedule> {
    if principal <= Decimal::ZERO {
        return Err(SocietyError::invalid(
            "principal",
            "principal must be positive",
        ));
    }
    if annual_rate_percent <= Decimal::ZERO {
        return Err(SocietyError::invalid(
            "interest_rate",
            "annual interest rate must be positive",
        ));
    }
    if months == 0 {
        return Err(SocietyError::invalid(
            "duration_months",
            "duration must be at least one month",
        ));
    }

    let monthly_rate = annual_rate_percent / PERCENT / MONTHS_PER_YEAR;
    let growth = (Decimal::ONE + monthly_rate).powi(months as i64);
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(SocietyError::invalid(
            "interest_rate",
            "rate too small to amortize over the given duration",
        ));
    }

    let emi_raw = principal * monthly_rate * growth / denominator;
    let emi_amount = round_money(emi_raw);
    let total_payable = round_money(emi_raw * Decimal::from(months));

    let mut installments = Vec::with_capacity(months as usize);
    for i in 0..months {
        let due_date = start_date
            .checked_add_months(Months::new(i))
            .ok_or_else(|| {
                SocietyError::invalid("emi_start_date", "schedule date out of range")
            })?;
        let amount = if i == months - 1 {
            // Final installment absorbs the rounding remainder.
            total_payable - emi_amount * Decimal::from(months - 1)
        } else {
            emi_amount
        };
        installments.push(Installment {
            amount,
            due_date,
            status: InstallmentStatus::Pending,
        });
    }

    Ok(EmiSchedule {
        emi_amount,
        total_payable,
        installments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_worked_example_12000_at_12_percent() {
        // P=12000, 12% p.a., 12 months => monthly rate 0.01, EMI 1066.19
        let schedule = compute_schedule(dec!(12000), dec!(12), 12, date(2025, 1, 1)).unwrap();

        assert_eq!(schedule.emi_amount, dec!(1066.19));
        assert_eq!(schedule.total_payable, dec!(12794.23));
        assert_eq!(schedule.installments.len(), 12);

        // Due on the 1st of each month Jan-Dec 2025.
        for (i, inst) in schedule.installments.iter().enumerate() {
            assert_eq!(inst.due_date, date(2025, 1 + i as u32, 1));
            assert_eq!(inst.status, InstallmentStatus::Pending);
        }
    }

    #[test]
    fn test_schedule_sums_to_total() {
        let schedule = compute_schedule(dec!(12000), dec!(12), 12, date(2025, 1, 1)).unwrap();
        let sum: Decimal = schedule.installments.iter().map(|i| i.amount).sum();
        assert_eq!(sum, schedule.total_payable);

        // Last installment differs from the level EMI only by the remainder.
        let last = schedule.installments.last().unwrap();
        assert_eq!(last.amount, dec!(1066.14));
    }

    #[test]
    fn test_emi_times_n_approximates_total() {
        let schedule = compute_schedule(dec!(50000), dec!(9.5), 36, date(2025, 3, 15)).unwrap();
        let diff = (schedule.emi_amount * dec!(36) - schedule.total_payable).abs();
        // Within the rounding slack of n half-cents.
        assert!(diff <= dec!(0.19), "diff was {diff}");
    }

    #[test]
    fn test_emi_monotonic_in_rate_and_duration() {
        let base = compute_schedule(dec!(12000), dec!(12), 12, date(2025, 1, 1)).unwrap();
        let higher_rate = compute_schedule(dec!(12000), dec!(15), 12, date(2025, 1, 1)).unwrap();
        let longer = compute_schedule(dec!(12000), dec!(12), 24, date(2025, 1, 1)).unwrap();

        assert!(higher_rate.emi_amount > base.emi_amount);
        assert!(longer.emi_amount < base.emi_amount);
    }

    #[test]
    fn test_month_end_clamping() {
        let schedule = compute_schedule(dec!(6000), dec!(10), 3, date(2025, 1, 31)).unwrap();
        let dates: Vec<NaiveDate> = schedule.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(dates, vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31)]);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let start = date(2025, 1, 1);
        assert!(compute_schedule(dec!(0), dec!(12), 12, start).is_err());
        assert!(compute_schedule(dec!(-100), dec!(12), 12, start).is_err());
        assert!(compute_schedule(dec!(12000), dec!(0), 12, start).is_err());
        assert!(compute_schedule(dec!(12000), dec!(-1), 12, start).is_err());
        assert!(compute_schedule(dec!(12000), dec!(12), 0, start).is_err());
    }

    #[test]
    fn test_single_month_loan() {
        let schedule = compute_schedule(dec!(1000), dec!(12), 1, date(2025, 6, 1)).unwrap();
        assert_eq!(schedule.installments.len(), 1);
        // One period at 1%: repay 1010 in a single installment.
        assert_eq!(schedule.emi_amount, dec!(1010.00));
        assert_eq!(schedule.installments[0].amount, schedule.total_payable);
    }
}
