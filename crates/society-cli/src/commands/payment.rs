use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use society_core::auth::Principal;
use society_core::service::{PaymentInput, SocietyService};

#[derive(Subcommand)]
pub enum PaymentCmd {
    /// Record a monthly contribution (staff)
    Make(MakeArgs),
    /// Correct a recorded contribution (admin)
    Update(UpdateArgs),
    /// Remove a contribution and reverse its ledger entry (admin)
    Delete {
        /// Payment id
        id: Uuid,
    },
    /// List contributions: admin sees all, staff their own
    List,
}

#[derive(Args)]
pub struct MakeArgs {
    /// Contribution amount; must match the currently effective amount
    #[arg(long)]
    pub amount: Decimal,

    /// Period label, e.g. 2025-01
    #[arg(long)]
    pub month: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Payment id
    pub id: Uuid,

    /// New amount; re-validated against the effective amount
    #[arg(long)]
    pub amount: Decimal,

    /// New period label
    #[arg(long)]
    pub month: String,
}

pub fn run(
    service: &SocietyService,
    principal: &Principal,
    cmd: &PaymentCmd,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match cmd {
        PaymentCmd::Make(args) => serde_json::to_value(service.make_payment(
            principal,
            PaymentInput {
                amount: args.amount,
                month: args.month.clone(),
            },
        )?)?,
        PaymentCmd::Update(args) => serde_json::to_value(service.update_payment(
            principal,
            args.id,
            PaymentInput {
                amount: args.amount,
                month: args.month.clone(),
            },
        )?)?,
        PaymentCmd::Delete { id } => {
            let total_balance = service.delete_payment(principal, *id)?;
            serde_json::json!({ "deleted": id, "total_balance": total_balance })
        }
        PaymentCmd::List => serde_json::to_value(service.list_payments(principal)?)?,
    };
    Ok(value)
}
