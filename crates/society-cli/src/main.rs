mod commands;
mod output;
mod state;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use uuid::Uuid;

use society_core::auth::{Principal, Role};
use society_core::service::SocietyService;
use society_core::SocietyError;

use commands::config::{AmountCmd, RateCmd};
use commands::emi::EmiArgs;
use commands::ledger::LedgerCmd;
use commands::loan::LoanCmd;
use commands::payment::PaymentCmd;

/// Membership-society back office: contributions, loans, treasury ledger
#[derive(Parser)]
#[command(
    name = "sfo",
    version,
    about = "Membership-society back office: contributions, loans, treasury ledger",
    long_about = "Back-office operations for a membership society: monthly \
                  contribution payments, loan requests with EMI schedules, and \
                  the treasury ledger they feed. State lives in a JSON file; \
                  the caller's identity and role stand in for the upstream \
                  authentication layer."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON state file
    #[arg(long, default_value = "society.json", global = true)]
    state: String,

    /// Acting user id (as resolved by the auth layer)
    #[arg(long, global = true)]
    user: Option<Uuid>,

    /// Acting role: staff or admin
    #[arg(long, global = true)]
    role: Option<Role>,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Loan lifecycle: request, decide, installments
    #[command(subcommand)]
    Loan(LoanCmd),
    /// Monthly contribution payments
    #[command(subcommand)]
    Payment(PaymentCmd),
    /// Manual treasury ledger entries
    #[command(subcommand)]
    Ledger(LedgerCmd),
    /// Show the current treasury balance
    Balance,
    /// Required contribution amount (time-versioned)
    #[command(subcommand)]
    Amount(AmountCmd),
    /// Suggested interest rate (time-versioned)
    #[command(subcommand)]
    Rate(RateCmd),
    /// Preview an EMI schedule without touching any loan
    Emi(EmiArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Minimal,
}

fn resolve_principal(user: Option<Uuid>, role: Option<Role>) -> Result<Principal, SocietyError> {
    match (user, role) {
        (Some(user_id), Some(role)) => Ok(Principal::new(user_id, role)),
        _ => Err(SocietyError::Unauthenticated),
    }
}

fn run(cli: &Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    // The EMI preview is a pure calculation; no state, no principal.
    if let Commands::Emi(args) = &cli.command {
        return commands::emi::run_preview(args);
    }

    let principal = resolve_principal(cli.user, cli.role)?;
    let service = SocietyService::new(state::load(&cli.state)?);

    let value = match &cli.command {
        Commands::Loan(cmd) => commands::loan::run(&service, &principal, cmd)?,
        Commands::Payment(cmd) => commands::payment::run(&service, &principal, cmd)?,
        Commands::Ledger(cmd) => commands::ledger::run(&service, &principal, cmd)?,
        Commands::Balance => {
            serde_json::json!({ "total_balance": service.total_balance(&principal)? })
        }
        Commands::Amount(cmd) => commands::config::run_amount(&service, &principal, cmd)?,
        Commands::Rate(cmd) => commands::config::run_rate(&service, &principal, cmd)?,
        Commands::Emi(_) | Commands::Version => unreachable!("handled above"),
    };

    state::save(&cli.state, &service)?;
    Ok(value)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("sfo {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    match run(&cli) {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
