use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::effective::EffectiveSeries;
use crate::error::SocietyError;
use crate::ledger::{self, LedgerEntry};
use crate::loan::LoanRecord;
use crate::payment::ContributionPayment;
use crate::types::Money;
use crate::SocietyResult;

/// Serializable snapshot of every collection, used by front ends that persist
/// the store as a single document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocietyState {
    pub loans: Vec<LoanRecord>,
    pub payments: Vec<ContributionPayment>,
    pub ledger: Vec<LedgerEntry>,
    pub contribution_amounts: EffectiveSeries,
    pub interest_rates: EffectiveSeries,
}

/// Shared mutable state for the back office: loans, contribution payments,
/// the treasury ledger, and the two time-versioned config series.
///
/// Collections sit behind independent `RwLock`s. Loan mutations run entirely
/// inside `modify_loan`, which holds the write guard across the caller's
/// read-modify-write span — the per-loan mutual exclusion the lifecycle
/// operations rely on. Ledger appends are pure inserts and freely concurrent
/// with respect to the other collections.
#[derive(Debug, Default)]
pub struct SocietyStore {
    loans: RwLock<HashMap<Uuid, LoanRecord>>,
    payments: RwLock<HashMap<Uuid, ContributionPayment>>,
    ledger: RwLock<Vec<LedgerEntry>>,
    contribution_amounts: RwLock<EffectiveSeries>,
    interest_rates: RwLock<EffectiveSeries>,
}

fn poisoned() -> SocietyError {
    SocietyError::Storage("lock poisoned".into())
}

impl SocietyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(state: SocietyState) -> Self {
        SocietyStore {
            loans: RwLock::new(state.loans.into_iter().map(|l| (l.id, l)).collect()),
            payments: RwLock::new(state.payments.into_iter().map(|p| (p.id, p)).collect()),
            ledger: RwLock::new(state.ledger),
            contribution_amounts: RwLock::new(state.contribution_amounts),
            interest_rates: RwLock::new(state.interest_rates),
        }
    }

    pub fn snapshot(&self) -> SocietyResult<SocietyState> {
        let mut loans: Vec<LoanRecord> = self
            .loans
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.requested_at);

        let mut payments: Vec<ContributionPayment> = self
            .payments
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.timestamp);

        Ok(SocietyState {
            loans,
            payments,
            ledger: self.ledger.read().map_err(|_| poisoned())?.clone(),
            contribution_amounts: self.contribution_amounts.read().map_err(|_| poisoned())?.clone(),
            interest_rates: self.interest_rates.read().map_err(|_| poisoned())?.clone(),
        })
    }

    // -- Loans ---------------------------------------------------------------

    pub fn insert_loan(&self, loan: LoanRecord) -> SocietyResult<()> {
        self.loans
            .write()
            .map_err(|_| poisoned())?
            .insert(loan.id, loan);
        Ok(())
    }

    pub fn get_loan(&self, id: Uuid) -> SocietyResult<LoanRecord> {
        self.loans
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or_else(|| SocietyError::not_found("loan", id))
    }

    /// Run a read-modify-write span against one loan under the write guard.
    /// The version field is bumped only when the closure succeeds.
    pub fn modify_loan<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut LoanRecord) -> SocietyResult<T>,
    ) -> SocietyResult<T> {
        let mut loans = self.loans.write().map_err(|_| poisoned())?;
        let loan = loans
            .get_mut(&id)
            .ok_or_else(|| SocietyError::not_found("loan", id))?;
        let out = f(loan)?;
        loan.version += 1;
        Ok(out)
    }

    pub fn remove_loan(&self, id: Uuid) -> SocietyResult<LoanRecord> {
        self.loans
            .write()
            .map_err(|_| poisoned())?
            .remove(&id)
            .ok_or_else(|| SocietyError::not_found("loan", id))
    }

    /// All loans, or one owner's, newest first.
    pub fn list_loans(&self, owner: Option<Uuid>) -> SocietyResult<Vec<LoanRecord>> {
        let loans = self.loans.read().map_err(|_| poisoned())?;
        let mut out: Vec<LoanRecord> = loans
            .values()
            .filter(|l| owner.map_or(true, |o| l.owner == o))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(out)
    }

    // -- Payments ------------------------------------------------------------

    pub fn insert_payment(&self, payment: ContributionPayment) -> SocietyResult<()> {
        self.payments
            .write()
            .map_err(|_| poisoned())?
            .insert(payment.id, payment);
        Ok(())
    }

    pub fn get_payment(&self, id: Uuid) -> SocietyResult<ContributionPayment> {
        self.payments
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or_else(|| SocietyError::not_found("payment", id))
    }

    pub fn replace_payment(&self, payment: ContributionPayment) -> SocietyResult<()> {
        let mut payments = self.payments.write().map_err(|_| poisoned())?;
        if !payments.contains_key(&payment.id) {
            return Err(SocietyError::not_found("payment", payment.id));
        }
        payments.insert(payment.id, payment);
        Ok(())
    }

    pub fn remove_payment(&self, id: Uuid) -> SocietyResult<ContributionPayment> {
        self.payments
            .write()
            .map_err(|_| poisoned())?
            .remove(&id)
            .ok_or_else(|| SocietyError::not_found("payment", id))
    }

    pub fn list_payments(&self, owner: Option<Uuid>) -> SocietyResult<Vec<ContributionPayment>> {
        let payments = self.payments.read().map_err(|_| poisoned())?;
        let mut out: Vec<ContributionPayment> = payments
            .values()
            .filter(|p| owner.map_or(true, |o| p.owner == o))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    // -- Ledger --------------------------------------------------------------

    /// Append an entry and return it together with the recomputed balance.
    pub fn post_entry(&self, entry: LedgerEntry) -> SocietyResult<(LedgerEntry, Money)> {
        let mut entries = self.ledger.write().map_err(|_| poisoned())?;
        entries.push(entry.clone());
        Ok((entry, ledger::total_balance(&entries)))
    }

    pub fn update_entry(
        &self,
        id: Uuid,
        amount: Option<Money>,
        note: Option<String>,
    ) -> SocietyResult<(LedgerEntry, Money)> {
        let mut entries = self.ledger.write().map_err(|_| poisoned())?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SocietyError::not_found("ledger entry", id))?;
        if let Some(a) = amount {
            entry.amount = crate::types::round_money(a);
        }
        if let Some(n) = note {
            entry.note = n;
        }
        let updated = entry.clone();
        Ok((updated, ledger::total_balance(&entries)))
    }

    pub fn remove_entry(&self, id: Uuid) -> SocietyResult<Money> {
        let mut entries = self.ledger.write().map_err(|_| poisoned())?;
        let pos = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SocietyError::not_found("ledger entry", id))?;
        entries.remove(pos);
        Ok(ledger::total_balance(&entries))
    }

    pub fn list_entries(&self) -> SocietyResult<(Vec<LedgerEntry>, Money)> {
        let entries = self.ledger.read().map_err(|_| poisoned())?;
        let balance = ledger::total_balance(&entries);
        let mut out = entries.clone();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok((out, balance))
    }

    pub fn total_balance(&self) -> SocietyResult<Money> {
        let entries = self.ledger.read().map_err(|_| poisoned())?;
        Ok(ledger::total_balance(&entries))
    }

    // -- Effective series ----------------------------------------------------

    pub fn with_amounts<T>(
        &self,
        f: impl FnOnce(&mut EffectiveSeries) -> SocietyResult<T>,
    ) -> SocietyResult<T> {
        let mut series = self.contribution_amounts.write().map_err(|_| poisoned())?;
        f(&mut series)
    }

    pub fn read_amounts<T>(&self, f: impl FnOnce(&EffectiveSeries) -> T) -> SocietyResult<T> {
        let series = self.contribution_amounts.read().map_err(|_| poisoned())?;
        Ok(f(&series))
    }

    pub fn with_rates<T>(
        &self,
        f: impl FnOnce(&mut EffectiveSeries) -> SocietyResult<T>,
    ) -> SocietyResult<T> {
        let mut series = self.interest_rates.write().map_err(|_| poisoned())?;
        f(&mut series)
    }

    pub fn read_rates<T>(&self, f: impl FnOnce(&EffectiveSeries) -> T) -> SocietyResult<T> {
        let series = self.interest_rates.read().map_err(|_| poisoned())?;
        Ok(f(&series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_modify_loan_bumps_version_on_success_only() {
        let store = SocietyStore::new();
        let loan = LoanRecord::new(Uuid::new_v4(), dec!(5000), "tools".into()).unwrap();
        let id = loan.id;
        store.insert_loan(loan).unwrap();

        store
            .modify_loan(id, |l| {
                l.reason = "tools and parts".into();
                Ok(())
            })
            .unwrap();
        assert_eq!(store.get_loan(id).unwrap().version, 1);

        let failed: SocietyResult<()> = store.modify_loan(id, |_| {
            Err(SocietyError::invalid("status", "nope"))
        });
        assert!(failed.is_err());
        assert_eq!(store.get_loan(id).unwrap().version, 1);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let store = SocietyStore::new();
        let loan = LoanRecord::new(Uuid::new_v4(), dec!(5000), "tools".into()).unwrap();
        let loan_id = loan.id;
        store.insert_loan(loan).unwrap();
        store
            .insert_payment(
                ContributionPayment::new(Uuid::new_v4(), dec!(600), "2025-01").unwrap(),
            )
            .unwrap();
        store
            .post_entry(LedgerEntry::new(dec!(600), "contribution"))
            .unwrap();
        store
            .with_amounts(|s| s.add(dec!(600), chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
            .unwrap();

        let state = store.snapshot().unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: SocietyState = serde_json::from_str(&json).unwrap();
        let restored = SocietyStore::restore(back);

        assert_eq!(restored.get_loan(loan_id).unwrap().id, loan_id);
        assert_eq!(restored.list_payments(None).unwrap().len(), 1);
        assert_eq!(restored.total_balance().unwrap(), dec!(600));
        assert_eq!(
            restored
                .read_amounts(|s| s.value_at(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
                .unwrap(),
            Some(dec!(600))
        );
    }

    #[test]
    fn test_missing_records_report_not_found() {
        let store = SocietyStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.get_loan(id),
            Err(SocietyError::NotFound { resource: "loan", .. })
        ));
        assert!(store.get_payment(id).is_err());
        assert!(store.remove_entry(id).is_err());
    }
}
