use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{round_money, Money};

/// A signed cash movement in the society's treasury. Positive amounts are
/// inflows, negative amounts outflows. Entries posted by the loan and payment
/// paths are never edited; corrections arrive as new entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub amount: Money,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(amount: Money, note: impl Into<String>) -> Self {
        LedgerEntry {
            id: Uuid::new_v4(),
            amount: round_money(amount),
            note: note.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Running balance as a fold over the full entry set. Recomputed from source
/// on every call rather than maintained incrementally, so it self-heals after
/// bulk edits to the entries. Rounded to 2dp for presentation.
pub fn total_balance(entries: &[LedgerEntry]) -> Money {
    round_money(entries.iter().map(|e| e.amount).sum())
}
