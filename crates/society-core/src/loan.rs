use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::emi::{EmiSchedule, Installment, InstallmentStatus};
use crate::error::SocietyError;
use crate::types::{Money, Rate};
use crate::SocietyResult;

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl LoanStatus {
    /// Explicit transition table. Forward moves only, except the admin
    /// override back to `Pending`; a self-transition is a no-op.
    pub fn can_transition(self, to: LoanStatus) -> bool {
        use LoanStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Completed) | (_, Pending)
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LoanStatus {
    type Err = SocietyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(LoanStatus::Pending),
            "approved" => Ok(LoanStatus::Approved),
            "rejected" => Ok(LoanStatus::Rejected),
            "completed" => Ok(LoanStatus::Completed),
            other => Err(SocietyError::invalid(
                "status",
                &format!("invalid status '{other}', expected pending, approved, rejected or completed"),
            )),
        }
    }
}

/// A member's loan. Rate, duration, EMI, total and schedule are absent while
/// the request is pending and set by the approval decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: Uuid,
    pub owner: Uuid,
    pub principal: Money,
    pub reason: String,
    pub status: LoanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emi_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_payable: Option<Money>,
    pub schedule: Vec<Installment>,
    pub requested_at: DateTime<Utc>,
    /// Bumped on every successful write; persistence layers use it for
    /// optimistic concurrency checks.
    #[serde(default)]
    pub version: u64,
}

impl LoanRecord {
    pub fn new(owner: Uuid, principal: Money, reason: String) -> SocietyResult<Self> {
        if principal <= Decimal::ZERO {
            return Err(SocietyError::invalid(
                "principal",
                "principal must be positive",
            ));
        }
        if reason.trim().is_empty() {
            return Err(SocietyError::invalid("reason", "reason must not be empty"));
        }
        Ok(LoanRecord {
            id: Uuid::new_v4(),
            owner,
            principal,
            reason,
            status: LoanStatus::Pending,
            interest_rate: None,
            duration_months: None,
            emi_amount: None,
            total_payable: None,
            schedule: Vec::new(),
            requested_at: Utc::now(),
            version: 0,
        })
    }

    /// Validate a status change against the transition table.
    pub fn check_transition(&self, to: LoanStatus) -> SocietyResult<()> {
        if self.status.can_transition(to) {
            Ok(())
        } else {
            Err(SocietyError::invalid(
                "status",
                &format!("cannot move loan from {} to {}", self.status, to),
            ))
        }
    }

    /// Apply an approval: record the negotiated terms and install the freshly
    /// computed schedule, replacing any previous one.
    pub fn approve(&mut self, rate: Rate, duration_months: u32, schedule: EmiSchedule) {
        self.status = LoanStatus::Approved;
        self.interest_rate = Some(rate);
        self.duration_months = Some(duration_months);
        self.emi_amount = Some(schedule.emi_amount);
        self.total_payable = Some(schedule.total_payable);
        self.schedule = schedule.installments;
    }

    /// Sum of installments already paid.
    pub fn paid_total(&self) -> Money {
        self.schedule
            .iter()
            .filter(|i| i.status == InstallmentStatus::Paid)
            .map(|i| i.amount)
            .sum()
    }

    /// Number of installments still pending.
    pub fn pending_count(&self) -> usize {
        self.schedule
            .iter()
            .filter(|i| i.status == InstallmentStatus::Pending)
            .count()
    }

    pub fn fully_paid(&self) -> bool {
        !self.schedule.is_empty()
            && self
                .schedule
                .iter()
                .all(|i| i.status == InstallmentStatus::Paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transition_table() {
        use LoanStatus::*;
        assert!(Pending.can_transition(Approved));
        assert!(Pending.can_transition(Rejected));
        assert!(Approved.can_transition(Completed));
        // Admin override back to pending from anywhere.
        assert!(Rejected.can_transition(Pending));
        assert!(Completed.can_transition(Pending));
        // Everything else is refused.
        assert!(!Rejected.can_transition(Approved));
        assert!(!Completed.can_transition(Approved));
        assert!(!Pending.can_transition(Completed));
        assert!(!Approved.can_transition(Rejected));
        // Self-transition is a no-op, not an error.
        assert!(Approved.can_transition(Approved));
    }

    #[test]
    fn test_new_loan_starts_pending_without_terms() {
        let loan = LoanRecord::new(Uuid::new_v4(), dec!(12000), "roof repair".into()).unwrap();
        assert_eq!(loan.status, LoanStatus::Pending);
        assert!(loan.schedule.is_empty());
        assert!(loan.interest_rate.is_none());
        assert!(loan.emi_amount.is_none());
    }

    #[test]
    fn test_new_loan_validation() {
        let owner = Uuid::new_v4();
        assert!(LoanRecord::new(owner, dec!(0), "x".into()).is_err());
        assert!(LoanRecord::new(owner, dec!(-5), "x".into()).is_err());
        assert!(LoanRecord::new(owner, dec!(100), "  ".into()).is_err());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Approved".parse::<LoanStatus>().unwrap(), LoanStatus::Approved);
        assert!("cancelled".parse::<LoanStatus>().is_err());
    }
}
