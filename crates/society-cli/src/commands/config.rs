use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use society_core::auth::Principal;
use society_core::service::SocietyService;

#[derive(Subcommand)]
pub enum AmountCmd {
    /// Add a contribution amount effective from a date (admin)
    Add(AddArgs),
    /// Change an existing amount record (admin)
    Update(UpdateArgs),
    /// Remove an amount record (admin)
    Delete {
        /// Record id
        id: Uuid,
    },
    /// List all amount records (admin)
    List,
    /// Show the amount currently in effect
    Current,
}

#[derive(Subcommand)]
pub enum RateCmd {
    /// Add an interest rate effective from a date (admin)
    Add(AddArgs),
    /// Change an existing rate record (admin)
    Update(UpdateArgs),
    /// Remove a rate record (admin)
    Delete {
        /// Record id
        id: Uuid,
    },
    /// List all rate records (admin)
    List,
    /// Show the rate currently in effect, if any
    Current,
}

#[derive(Args)]
pub struct AddArgs {
    /// Value (amount in currency units, or rate in percent)
    #[arg(long)]
    pub value: Decimal,

    /// Date the value takes effect (YYYY-MM-DD)
    #[arg(long)]
    pub effective: NaiveDate,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Record id
    pub id: Uuid,

    /// New value
    #[arg(long)]
    pub value: Option<Decimal>,

    /// New effective date
    #[arg(long)]
    pub effective: Option<NaiveDate>,
}

pub fn run_amount(
    service: &SocietyService,
    principal: &Principal,
    cmd: &AmountCmd,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match cmd {
        AmountCmd::Add(args) => {
            serde_json::to_value(service.add_amount(principal, args.value, args.effective)?)?
        }
        AmountCmd::Update(args) => serde_json::to_value(service.update_amount(
            principal,
            args.id,
            args.value,
            args.effective,
        )?)?,
        AmountCmd::Delete { id } => {
            service.delete_amount(principal, *id)?;
            serde_json::json!({ "deleted": id })
        }
        AmountCmd::List => serde_json::to_value(service.list_amounts(principal)?)?,
        AmountCmd::Current => {
            serde_json::json!({ "amount": service.current_amount(principal)? })
        }
    };
    Ok(value)
}

pub fn run_rate(
    service: &SocietyService,
    principal: &Principal,
    cmd: &RateCmd,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match cmd {
        RateCmd::Add(args) => {
            serde_json::to_value(service.add_rate(principal, args.value, args.effective)?)?
        }
        RateCmd::Update(args) => serde_json::to_value(service.update_rate(
            principal,
            args.id,
            args.value,
            args.effective,
        )?)?,
        RateCmd::Delete { id } => {
            service.delete_rate(principal, *id)?;
            serde_json::json!({ "deleted": id })
        }
        RateCmd::List => serde_json::to_value(service.list_rates(principal)?)?,
        RateCmd::Current => {
            serde_json::json!({ "rate": service.current_rate(principal)? })
        }
    };
    Ok(value)
}
