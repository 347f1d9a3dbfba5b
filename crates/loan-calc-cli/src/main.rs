mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::annuity::{AnnuityArgs, AnnuityFvArgs};
use commands::interest::{CapitalizeArgs, CompoundInterestArgs, SimpleInterestArgs};
use commands::periods::PeriodsArgs;
use commands::rates::{RateConvertArgs, RateRelationArgs};
use commands::schedule::ScheduleArgs;
use commands::time_value::{GradientArgs, IrrArgs, NpvArgs};
use config::CliConfig;

/// Loan amortization, annuity and interest-rate calculations
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan amortization, annuity and interest-rate calculations",
    long_about = "A CLI for loan and time-value-of-money calculations with decimal \
                  precision. Builds simple, French, German, American and compound \
                  amortization schedules, solves annuities, converts nominal and \
                  effective rates, and computes IRR, NPV and gradient series."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Configuration file (defaults to ./loancalc.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log solver and schedule details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an amortization schedule
    Schedule(ScheduleArgs),
    /// Solve an annuity for payment, rate, periods or its values
    Annuity(AnnuityArgs),
    /// Future value of an ordinary annuity
    AnnuityFv(AnnuityFvArgs),
    /// Convert a rate between nominal/effective and compounding frequencies
    RateConvert(RateConvertArgs),
    /// Solve the missing one of nominal %, effective % and compounding periods
    RateRelation(RateRelationArgs),
    /// Internal rate of return of a cash-flow series
    Irr(IrrArgs),
    /// Net present value of a cash-flow series
    Npv(NpvArgs),
    /// Present value of an arithmetic gradient series
    Gradient(GradientArgs),
    /// Simple interest: solve capital, amount, rate or term
    SimpleInterest(SimpleInterestArgs),
    /// Compound interest: solve capital, amount, rate or term
    CompoundInterest(CompoundInterestArgs),
    /// Accumulated amount under simple or compound capitalization
    Capitalize(CapitalizeArgs),
    /// Convert a term to a period count or a period count to a term
    Periods(PeriodsArgs),
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

fn init_tracing(config: &CliConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    init_tracing(&config, cli.verbose);
    debug!(log_level = %config.log_level, "configuration loaded");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Annuity(args) => commands::annuity::run_annuity(args, &config),
        Commands::AnnuityFv(args) => commands::annuity::run_annuity_fv(args),
        Commands::RateConvert(args) => commands::rates::run_rate_convert(args),
        Commands::RateRelation(args) => commands::rates::run_rate_relation(args),
        Commands::Irr(args) => commands::time_value::run_irr(args, &config),
        Commands::Npv(args) => commands::time_value::run_npv(args),
        Commands::Gradient(args) => commands::time_value::run_gradient(args),
        Commands::SimpleInterest(args) => commands::interest::run_simple_interest(args),
        Commands::CompoundInterest(args) => commands::interest::run_compound_interest(args),
        Commands::Capitalize(args) => commands::interest::run_capitalize(args),
        Commands::Periods(args) => commands::periods::run_periods(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_schedule_flags_parse() {
        let cli = Cli::try_parse_from([
            "loancalc", "schedule", "--method", "frances", "--principal", "1000000", "--rate", "12",
            "--years", "1", "--output", "table",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Table));
        match cli.command {
            Commands::Schedule(args) => {
                assert_eq!(args.method, Some(loan_calc_core::amortization::AmortizationMethod::French));
                assert_eq!(args.frequency, loan_calc_core::Frequency::Monthly);
            }
            _ => panic!("expected schedule"),
        }
    }

    #[test]
    fn test_negative_cash_flows_accepted() {
        let cli = Cli::try_parse_from([
            "loancalc", "irr", "--outlay", "1000", "--flows", "800,-200,700",
        ])
        .unwrap();
        match cli.command {
            Commands::Irr(args) => assert_eq!(args.flows.map(|f| f.len()), Some(3)),
            _ => panic!("expected irr"),
        }
    }

    #[test]
    fn test_unknown_frequency_rejected() {
        assert!(Cli::try_parse_from(["loancalc", "periods", "--years", "1", "--frequency", "weekly"]).is_err());
    }
}
