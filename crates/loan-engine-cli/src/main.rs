mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::loan::{CalculateArgs, ExportArgs};
use commands::tools::{FormatArgs, ParseAmountArgs, RatesArgs};

/// Loan calculations from spelled-out purchase values
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan calculations from spelled-out purchase values",
    long_about = "Parses a spelled-out purchase value and runs it through the truncating \
                  loan pipeline: reduction, down payment, principal, interest, insurance, \
                  PMI and property tax. Also renders amounts, looks up rate tiers, and \
                  exports batches of records to CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log pipeline steps to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full loan calculation for one application
    Calculate(CalculateArgs),
    /// Calculate a batch of applications and write the export CSV
    Export(ExportArgs),
    /// Parse a "<words> dollars and <words> cents" phrase
    ParseAmount(ParseAmountArgs),
    /// Render an amount in comma or spaced-dollar style
    Format(FormatArgs),
    /// Look up property insurance and PMI rates
    Rates(RatesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::loan::run_calculate(args),
        Commands::Export(args) => commands::loan::run_export(args),
        Commands::ParseAmount(args) => commands::tools::run_parse_amount(args),
        Commands::Format(args) => commands::tools::run_format(args),
        Commands::Rates(args) => commands::tools::run_rates(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result.and_then(|value| output::format_output(&cli.output, &value)) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
