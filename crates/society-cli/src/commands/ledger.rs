use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use society_core::auth::Principal;
use society_core::service::SocietyService;

#[derive(Subcommand)]
pub enum LedgerCmd {
    /// Post a manual adjustment entry (admin). Positive = inflow.
    Add(AddArgs),
    /// Correct a manual entry's amount or note (admin)
    Update(UpdateArgs),
    /// Delete an entry (admin)
    Delete {
        /// Entry id
        id: Uuid,
    },
    /// List all entries with the running balance (admin)
    List,
}

#[derive(Args)]
pub struct AddArgs {
    /// Signed amount; positive for inflows, negative for outflows
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Decimal,

    /// Free-text note
    #[arg(long, default_value = "")]
    pub note: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Entry id
    pub id: Uuid,

    /// New signed amount
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<Decimal>,

    /// New note
    #[arg(long)]
    pub note: Option<String>,
}

pub fn run(
    service: &SocietyService,
    principal: &Principal,
    cmd: &LedgerCmd,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match cmd {
        LedgerCmd::Add(args) => serde_json::to_value(service.create_ledger_entry(
            principal,
            args.amount,
            args.note.clone(),
        )?)?,
        LedgerCmd::Update(args) => serde_json::to_value(service.update_ledger_entry(
            principal,
            args.id,
            args.amount,
            args.note.clone(),
        )?)?,
        LedgerCmd::Delete { id } => {
            let total_balance = service.delete_ledger_entry(principal, *id)?;
            serde_json::json!({ "deleted": id, "total_balance": total_balance })
        }
        LedgerCmd::List => serde_json::to_value(service.list_ledger_entries(principal)?)?,
    };
    Ok(value)
}
