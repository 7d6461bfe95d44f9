use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{require_admin, require_owner_or_admin, require_staff, Principal};
use crate::effective::{EffectiveRecord, DEFAULT_CONTRIBUTION_AMOUNT};
use crate::emi::{self, InstallmentStatus};
use crate::error::SocietyError;
use crate::ledger::LedgerEntry;
use crate::loan::{LoanRecord, LoanStatus};
use crate::payment::{validate_month_label, ContributionPayment};
use crate::store::SocietyStore;
use crate::types::{Money, Rate};
use crate::SocietyResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequestInput {
    pub principal: Money,
    pub reason: String,
}

/// Admin decision on a loan. The interest rate may be omitted on approval,
/// in which case the currently effective rate is used as the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDecisionInput {
    pub target_status: LoanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emi_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentUpdateInput {
    pub installment_index: usize,
    pub target_status: InstallmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub loan: LoanRecord,
    pub total_balance: Money,
}

/// Loan plus the derived repayment progress figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetailsOutput {
    pub loan: LoanRecord,
    pub paid_total: Money,
    pub pending_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub amount: Money,
    pub month: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    pub payment: ContributionPayment,
    pub total_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryOutput {
    pub entry: LedgerEntry,
    pub total_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerListOutput {
    pub entries: Vec<LedgerEntry>,
    pub total_balance: Money,
}

// ---------------------------------------------------------------------------
// Service facade
// ---------------------------------------------------------------------------

/// The back-office operations, gated by the caller's resolved `Principal`.
///
/// Every operation validates synchronously before mutating. A loan mutation
/// and its ledger posting are two steps, not one transaction; the ledger
/// entry is always posted before the operation returns so the reported
/// balance reflects the mutation.
pub struct SocietyService {
    store: SocietyStore,
}

impl SocietyService {
    pub fn new(store: SocietyStore) -> Self {
        SocietyService { store }
    }

    pub fn store(&self) -> &SocietyStore {
        &self.store
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    // -- Loan lifecycle ------------------------------------------------------

    /// Staff request a loan. Created pending, with no schedule and no terms.
    pub fn request_loan(
        &self,
        principal: &Principal,
        input: LoanRequestInput,
    ) -> SocietyResult<LoanRecord> {
        require_staff(principal)?;
        let loan = LoanRecord::new(principal.user_id, input.principal, input.reason)?;
        self.store.insert_loan(loan.clone())?;
        info!(loan_id = %loan.id, principal = %loan.principal, "loan requested");
        Ok(loan)
    }

    /// Admin decision. Approval requires duration and a start date (rate
    /// falls back to the effective rate) and regenerates the schedule;
    /// funding the loan posts a `-principal` ledger entry. Any other target
    /// is a bare, table-checked status write.
    pub fn decide_loan(
        &self,
        principal: &Principal,
        loan_id: Uuid,
        input: LoanDecisionInput,
    ) -> SocietyResult<LoanOutput> {
        require_admin(principal)?;

        // Resolve the rate default before entering the loan's critical span.
        let default_rate = self.store.read_rates(|s| s.value_at(self.today()))?;

        let posting = self.store.modify_loan(loan_id, |loan| {
            loan.check_transition(input.target_status)?;
            if input.target_status == loan.status {
                return Ok(None); // no-op, nothing regenerated, nothing posted
            }

            if input.target_status == LoanStatus::Approved {
                let rate = input.interest_rate.or(default_rate).ok_or_else(|| {
                    SocietyError::invalid(
                        "interest_rate",
                        "interest rate is required (none configured as effective)",
                    )
                })?;
                let months = input.duration_months.ok_or_else(|| {
                    SocietyError::invalid("duration_months", "duration is required for approval")
                })?;
                let start = input.emi_start_date.ok_or_else(|| {
                    SocietyError::invalid("emi_start_date", "EMI start date is required for approval")
                })?;

                let schedule = emi::compute_schedule(loan.principal, rate, months, start)?;
                loan.approve(rate, months, schedule);
                Ok(Some(LedgerEntry::new(
                    -loan.principal,
                    format!("Loan {} funded", loan.id),
                )))
            } else {
                loan.status = input.target_status;
                Ok(None)
            }
        })?;

        let total_balance = match posting {
            Some(entry) => {
                let (_, balance) = self.store.post_entry(entry)?;
                balance
            }
            None => self.store.total_balance()?,
        };

        let loan = self.store.get_loan(loan_id)?;
        info!(loan_id = %loan_id, status = %loan.status, "loan decision applied");
        Ok(LoanOutput { loan, total_balance })
    }

    /// Admin marks one installment paid or reverts it to pending.
    ///
    /// Pending -> paid posts `+amount`; paid -> pending posts the reversing
    /// `-amount`; repeating the current status posts nothing. Once every
    /// installment is paid the loan completes, and stays completed even if an
    /// installment is later reverted.
    pub fn record_installment(
        &self,
        principal: &Principal,
        loan_id: Uuid,
        input: InstallmentUpdateInput,
    ) -> SocietyResult<LoanOutput> {
        require_admin(principal)?;

        let posting = self.store.modify_loan(loan_id, |loan| {
            let count = loan.schedule.len();
            let installment = loan
                .schedule
                .get_mut(input.installment_index)
                .ok_or_else(|| {
                    SocietyError::invalid(
                        "installment_index",
                        &format!(
                            "index {} out of bounds for schedule of {count}",
                            input.installment_index
                        ),
                    )
                })?;

            if installment.status == input.target_status {
                return Ok(None);
            }
            installment.status = input.target_status;
            let amount = installment.amount;

            let entry = match input.target_status {
                InstallmentStatus::Paid => LedgerEntry::new(
                    amount,
                    format!("Loan {} installment {} received", loan_id, input.installment_index + 1),
                ),
                InstallmentStatus::Pending => LedgerEntry::new(
                    -amount,
                    format!("Loan {} installment {} reversed", loan_id, input.installment_index + 1),
                ),
            };

            if loan.status == LoanStatus::Approved && loan.fully_paid() {
                loan.status = LoanStatus::Completed;
                info!(loan_id = %loan_id, "all installments paid, loan completed");
            }
            Ok(Some(entry))
        })?;

        let total_balance = match posting {
            Some(entry) => self.store.post_entry(entry)?.1,
            None => self.store.total_balance()?,
        };

        let loan = self.store.get_loan(loan_id)?;
        Ok(LoanOutput { loan, total_balance })
    }

    /// Loan plus repayment progress; owner or admin.
    pub fn loan_details(
        &self,
        principal: &Principal,
        loan_id: Uuid,
    ) -> SocietyResult<LoanDetailsOutput> {
        let loan = self.store.get_loan(loan_id)?;
        require_owner_or_admin(principal, loan.owner)?;
        let paid_total = loan.paid_total();
        let pending_count = loan.pending_count();
        Ok(LoanDetailsOutput {
            loan,
            paid_total,
            pending_count,
        })
    }

    /// Admin sees every loan; staff see their own.
    pub fn list_loans(&self, principal: &Principal) -> SocietyResult<Vec<LoanRecord>> {
        let owner = if principal.is_admin() {
            None
        } else {
            Some(principal.user_id)
        };
        self.store.list_loans(owner)
    }

    /// Admin delete. No ledger reversal: funding entries stay in history.
    pub fn delete_loan(&self, principal: &Principal, loan_id: Uuid) -> SocietyResult<()> {
        require_admin(principal)?;
        let loan = self.store.remove_loan(loan_id)?;
        info!(loan_id = %loan.id, "loan deleted");
        Ok(())
    }

    // -- Payment recorder ----------------------------------------------------

    /// Staff pay the monthly contribution. The amount must exactly match the
    /// currently effective contribution amount.
    pub fn make_payment(
        &self,
        principal: &Principal,
        input: PaymentInput,
    ) -> SocietyResult<PaymentOutput> {
        require_staff(principal)?;
        let required = self.current_amount_value()?;
        if input.amount != required {
            return Err(SocietyError::invalid(
                "amount",
                &format!("amount must be exactly {required}"),
            ));
        }

        let payment = ContributionPayment::new(principal.user_id, input.amount, input.month)?;
        self.store.insert_payment(payment.clone())?;
        let (_, total_balance) = self.store.post_entry(LedgerEntry::new(
            payment.amount,
            format!("Contribution {} from {}", payment.month, payment.owner),
        ))?;
        info!(payment_id = %payment.id, month = %payment.month, "contribution recorded");
        Ok(PaymentOutput {
            payment,
            total_balance,
        })
    }

    /// Admin correction. The new amount is re-validated against the current
    /// effective amount and the ledger receives the delta — zero included, so
    /// the adjustment trail stays complete.
    pub fn update_payment(
        &self,
        principal: &Principal,
        payment_id: Uuid,
        input: PaymentInput,
    ) -> SocietyResult<PaymentOutput> {
        require_admin(principal)?;
        validate_month_label(&input.month)?;
        let required = self.current_amount_value()?;
        if input.amount != required {
            return Err(SocietyError::invalid(
                "amount",
                &format!("amount must be exactly {required}"),
            ));
        }

        let mut payment = self.store.get_payment(payment_id)?;
        let delta = input.amount - payment.amount;
        payment.amount = input.amount;
        payment.month = input.month;
        self.store.replace_payment(payment.clone())?;

        let (_, total_balance) = self.store.post_entry(LedgerEntry::new(
            delta,
            format!("Contribution {} adjusted for {}", payment.month, payment.owner),
        ))?;
        info!(payment_id = %payment_id, %delta, "contribution adjusted");
        Ok(PaymentOutput {
            payment,
            total_balance,
        })
    }

    /// Admin delete. The reversing entry posts before the record goes, so
    /// the ledger never lags the payment set.
    pub fn delete_payment(&self, principal: &Principal, payment_id: Uuid) -> SocietyResult<Money> {
        require_admin(principal)?;
        let payment = self.store.get_payment(payment_id)?;
        let (_, total_balance) = self.store.post_entry(LedgerEntry::new(
            -payment.amount,
            format!("Contribution {} from {} removed", payment.month, payment.owner),
        ))?;
        self.store.remove_payment(payment_id)?;
        info!(payment_id = %payment_id, "contribution removed");
        Ok(total_balance)
    }

    pub fn list_payments(&self, principal: &Principal) -> SocietyResult<Vec<ContributionPayment>> {
        let owner = if principal.is_admin() {
            None
        } else {
            Some(principal.user_id)
        };
        self.store.list_payments(owner)
    }

    // -- Ledger (manual admin entries) ---------------------------------------

    pub fn create_ledger_entry(
        &self,
        principal: &Principal,
        amount: Money,
        note: String,
    ) -> SocietyResult<LedgerEntryOutput> {
        require_admin(principal)?;
        let (entry, total_balance) = self.store.post_entry(LedgerEntry::new(amount, note))?;
        debug!(entry_id = %entry.id, amount = %entry.amount, "manual ledger entry");
        Ok(LedgerEntryOutput {
            entry,
            total_balance,
        })
    }

    pub fn update_ledger_entry(
        &self,
        principal: &Principal,
        entry_id: Uuid,
        amount: Option<Money>,
        note: Option<String>,
    ) -> SocietyResult<LedgerEntryOutput> {
        require_admin(principal)?;
        let (entry, total_balance) = self.store.update_entry(entry_id, amount, note)?;
        Ok(LedgerEntryOutput {
            entry,
            total_balance,
        })
    }

    pub fn delete_ledger_entry(&self, principal: &Principal, entry_id: Uuid) -> SocietyResult<Money> {
        require_admin(principal)?;
        self.store.remove_entry(entry_id)
    }

    pub fn list_ledger_entries(&self, principal: &Principal) -> SocietyResult<LedgerListOutput> {
        require_admin(principal)?;
        let (entries, total_balance) = self.store.list_entries()?;
        Ok(LedgerListOutput {
            entries,
            total_balance,
        })
    }

    pub fn total_balance(&self, principal: &Principal) -> SocietyResult<Money> {
        require_admin(principal)?;
        self.store.total_balance()
    }

    // -- Effective contribution amount ---------------------------------------

    pub fn add_amount(
        &self,
        principal: &Principal,
        value: Money,
        effective_date: NaiveDate,
    ) -> SocietyResult<EffectiveRecord> {
        require_admin(principal)?;
        self.store.with_amounts(|s| s.add(value, effective_date))
    }

    pub fn update_amount(
        &self,
        principal: &Principal,
        id: Uuid,
        value: Option<Money>,
        effective_date: Option<NaiveDate>,
    ) -> SocietyResult<EffectiveRecord> {
        require_admin(principal)?;
        self.store.with_amounts(|s| s.update(id, value, effective_date))
    }

    pub fn delete_amount(&self, principal: &Principal, id: Uuid) -> SocietyResult<EffectiveRecord> {
        require_admin(principal)?;
        self.store.with_amounts(|s| s.remove(id))
    }

    pub fn list_amounts(&self, principal: &Principal) -> SocietyResult<Vec<EffectiveRecord>> {
        require_admin(principal)?;
        self.store.read_amounts(|s| s.records().to_vec())
    }

    /// The required contribution amount right now; any authenticated caller.
    pub fn current_amount(&self, _principal: &Principal) -> SocietyResult<Money> {
        self.current_amount_value()
    }

    fn current_amount_value(&self) -> SocietyResult<Money> {
        Ok(self
            .store
            .read_amounts(|s| s.value_at(self.today()))?
            .unwrap_or(DEFAULT_CONTRIBUTION_AMOUNT))
    }

    // -- Effective interest rate ---------------------------------------------

    pub fn add_rate(
        &self,
        principal: &Principal,
        value: Rate,
        effective_date: NaiveDate,
    ) -> SocietyResult<EffectiveRecord> {
        require_admin(principal)?;
        self.store.with_rates(|s| s.add(value, effective_date))
    }

    pub fn update_rate(
        &self,
        principal: &Principal,
        id: Uuid,
        value: Option<Rate>,
        effective_date: Option<NaiveDate>,
    ) -> SocietyResult<EffectiveRecord> {
        require_admin(principal)?;
        self.store.with_rates(|s| s.update(id, value, effective_date))
    }

    pub fn delete_rate(&self, principal: &Principal, id: Uuid) -> SocietyResult<EffectiveRecord> {
        require_admin(principal)?;
        self.store.with_rates(|s| s.remove(id))
    }

    pub fn list_rates(&self, principal: &Principal) -> SocietyResult<Vec<EffectiveRecord>> {
        require_admin(principal)?;
        self.store.read_rates(|s| s.records().to_vec())
    }

    /// The suggested interest rate right now, if one has been configured.
    pub fn current_rate(&self, _principal: &Principal) -> SocietyResult<Option<Rate>> {
        self.store.read_rates(|s| s.value_at(self.today()))
    }
}
