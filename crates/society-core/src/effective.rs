use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SocietyError;
use crate::types::Money;
use crate::SocietyResult;

/// Contribution amount assumed when no record has been configured.
pub const DEFAULT_CONTRIBUTION_AMOUNT: Money = dec!(600);

/// One version of a time-versioned scalar: a value and the date it takes
/// effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRecord {
    pub id: Uuid,
    pub value: Decimal,
    pub effective_date: NaiveDate,
}

/// A time-versioned scalar configuration: the value "current" at any instant
/// is the one with the latest effective date not after that instant.
///
/// Records are kept sorted by effective date so lookups are a binary search;
/// among records sharing a date, the most recently added wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectiveSeries {
    records: Vec<EffectiveRecord>,
}

impl EffectiveSeries {
    pub fn add(&mut self, value: Decimal, effective_date: NaiveDate) -> SocietyResult<EffectiveRecord> {
        if value <= Decimal::ZERO {
            return Err(SocietyError::invalid("value", "value must be positive"));
        }
        let record = EffectiveRecord {
            id: Uuid::new_v4(),
            value,
            effective_date,
        };
        let at = self
            .records
            .partition_point(|r| r.effective_date <= effective_date);
        self.records.insert(at, record.clone());
        Ok(record)
    }

    pub fn update(
        &mut self,
        id: Uuid,
        value: Option<Decimal>,
        effective_date: Option<NaiveDate>,
    ) -> SocietyResult<EffectiveRecord> {
        if let Some(v) = value {
            if v <= Decimal::ZERO {
                return Err(SocietyError::invalid("value", "value must be positive"));
            }
        }
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| SocietyError::not_found("effective record", id))?;

        let mut record = self.records.remove(pos);
        if let Some(v) = value {
            record.value = v;
        }
        if let Some(d) = effective_date {
            record.effective_date = d;
        }
        let at = self
            .records
            .partition_point(|r| r.effective_date <= record.effective_date);
        self.records.insert(at, record.clone());
        Ok(record)
    }

    pub fn remove(&mut self, id: Uuid) -> SocietyResult<EffectiveRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| SocietyError::not_found("effective record", id))?;
        Ok(self.records.remove(pos))
    }

    /// Latest value effective on or before `date`, if any.
    pub fn value_at(&self, date: NaiveDate) -> Option<Decimal> {
        let end = self.records.partition_point(|r| r.effective_date <= date);
        self.records[..end].last().map(|r| r.value)
    }

    pub fn records(&self) -> &[EffectiveRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
