use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use society_core::emi;

/// Arguments for the EMI schedule preview
#[derive(Args)]
pub struct EmiArgs {
    /// Principal amount
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Duration in months
    #[arg(long)]
    pub duration: u32,

    /// First installment due date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,
}

pub fn run_preview(args: &EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule = emi::compute_schedule(args.principal, args.rate, args.duration, args.start)?;
    Ok(serde_json::to_value(schedule)?)
}
