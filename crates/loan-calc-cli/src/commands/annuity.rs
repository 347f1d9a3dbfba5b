use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use loan_calc_core::annuity::{self, AnnuitySolveRequest, AnnuityTiming};

use super::parse_enum;
use crate::config::CliConfig;
use crate::input;

/// Arguments for the five-variable annuity solver. Leave exactly one of
/// payment, rate and periods out and give one of present/future value, or give
/// payment, rate and periods to get both values.
#[derive(Args)]
pub struct AnnuityArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Periodic payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Present value
    #[arg(long)]
    pub present_value: Option<Decimal>,

    /// Future value
    #[arg(long)]
    pub future_value: Option<Decimal>,

    /// Decimal rate per period (0.01 = 1%)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<Decimal>,

    /// Number of periods
    #[arg(long)]
    pub periods: Option<Decimal>,

    /// ordinary (end of period) or due (start of period)
    #[arg(long, default_value = "ordinary", value_parser = parse_enum::<AnnuityTiming>)]
    pub timing: AnnuityTiming,
}

pub fn run_annuity(args: AnnuityArgs, config: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let request: AnnuitySolveRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => AnnuitySolveRequest {
            payment: args.payment,
            present_value: args.present_value,
            future_value: args.future_value,
            rate: args.rate,
            periods: args.periods,
            timing: args.timing,
        },
    };

    let result = annuity::calculate_annuity(&request, &config.annuity_solver())?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the future value of an ordinary annuity
#[derive(Args)]
pub struct AnnuityFvArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Periodic payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Rate per period as a percentage (1 = 1%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Whole number of periods
    #[arg(long)]
    pub periods: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AnnuityFvRequest {
    payment: Decimal,
    rate_percent: Decimal,
    periods: u32,
}

pub fn run_annuity_fv(args: AnnuityFvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: AnnuityFvRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => AnnuityFvRequest {
            payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
            rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            periods: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
        },
    };

    let result = annuity::annuity_future_value(request.payment, request.rate_percent, request.periods)?;
    Ok(serde_json::to_value(result)?)
}
