use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SocietyError;
use crate::types::{round_money, Money};
use crate::SocietyResult;

/// A member's monthly contribution, keyed to a period label like "2025-01".
/// The amount must match the contribution amount in effect at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPayment {
    pub id: Uuid,
    pub owner: Uuid,
    pub amount: Money,
    pub month: String,
    pub timestamp: DateTime<Utc>,
}

impl ContributionPayment {
    pub fn new(owner: Uuid, amount: Money, month: impl Into<String>) -> SocietyResult<Self> {
        let month = month.into();
        validate_month_label(&month)?;
        Ok(ContributionPayment {
            id: Uuid::new_v4(),
            owner,
            amount: round_money(amount),
            month,
            timestamp: Utc::now(),
        })
    }
}

/// Period labels are "YYYY-MM".
pub fn validate_month_label(label: &str) -> SocietyResult<()> {
    let valid = label.len() == 7
        && label.as_bytes()[4] == b'-'
        && label[0..4].chars().all(|c| c.is_ascii_digit())
        && matches!(label[5..7].parse::<u8>(), Ok(1..=12));
    if valid {
        Ok(())
    } else {
        Err(SocietyError::invalid(
            "month",
            &format!("'{label}' is not a valid YYYY-MM period label"),
        ))
    }
}
