use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use society_core::auth::Principal;
use society_core::emi::InstallmentStatus;
use society_core::loan::LoanStatus;
use society_core::service::{
    InstallmentUpdateInput, LoanDecisionInput, LoanRequestInput, SocietyService,
};

#[derive(Subcommand)]
pub enum LoanCmd {
    /// Request a loan (staff)
    Request(RequestArgs),
    /// Approve, reject, or override a loan's status (admin)
    Decide(DecideArgs),
    /// Mark one installment paid or revert it to pending (admin)
    Installment(InstallmentArgs),
    /// Show one loan with repayment progress (owner or admin)
    Show {
        /// Loan id
        id: Uuid,
    },
    /// List loans: admin sees all, staff their own
    List,
    /// Delete a loan (admin)
    Delete {
        /// Loan id
        id: Uuid,
    },
}

#[derive(Args)]
pub struct RequestArgs {
    /// Principal amount
    #[arg(long)]
    pub principal: Decimal,

    /// Purpose of the loan
    #[arg(long)]
    pub reason: String,
}

#[derive(Args)]
pub struct DecideArgs {
    /// Loan id
    pub id: Uuid,

    /// Target status: approved, rejected, pending, completed
    #[arg(long)]
    pub status: LoanStatus,

    /// Annual interest rate in percent (defaults to the effective rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Repayment duration in months
    #[arg(long)]
    pub duration: Option<u32>,

    /// First installment due date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
}

#[derive(Args)]
pub struct InstallmentArgs {
    /// Loan id
    pub id: Uuid,

    /// Zero-based installment index within the schedule
    #[arg(long)]
    pub index: usize,

    /// Target status: paid or pending
    #[arg(long)]
    pub status: InstallmentStatus,
}

pub fn run(
    service: &SocietyService,
    principal: &Principal,
    cmd: &LoanCmd,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match cmd {
        LoanCmd::Request(args) => {
            let loan = service.request_loan(
                principal,
                LoanRequestInput {
                    principal: args.principal,
                    reason: args.reason.clone(),
                },
            )?;
            serde_json::to_value(loan)?
        }
        LoanCmd::Decide(args) => {
            let out = service.decide_loan(
                principal,
                args.id,
                LoanDecisionInput {
                    target_status: args.status,
                    interest_rate: args.rate,
                    duration_months: args.duration,
                    emi_start_date: args.start,
                },
            )?;
            serde_json::to_value(out)?
        }
        LoanCmd::Installment(args) => {
            let out = service.record_installment(
                principal,
                args.id,
                InstallmentUpdateInput {
                    installment_index: args.index,
                    target_status: args.status,
                },
            )?;
            serde_json::to_value(out)?
        }
        LoanCmd::Show { id } => serde_json::to_value(service.loan_details(principal, *id)?)?,
        LoanCmd::List => serde_json::to_value(service.list_loans(principal)?)?,
        LoanCmd::Delete { id } => {
            service.delete_loan(principal, *id)?;
            serde_json::json!({ "deleted": id })
        }
    };
    Ok(value)
}
