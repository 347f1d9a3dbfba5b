use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::gradient::{self, GradientSeriesInput};
use loan_calc_core::time_value::{self, CashFlowSeries, NpvRequest};

use crate::config::CliConfig;
use crate::input;

/// Arguments for an internal rate of return
#[derive(Args)]
pub struct IrrArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial outlay (positive)
    #[arg(long)]
    pub outlay: Option<Decimal>,

    /// Period cash flows (comma-separated, e.g. "3000,4000,5000,2000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub flows: Option<Vec<Decimal>>,
}

fn series_from_flags(
    outlay: Option<Decimal>,
    flows: Option<Vec<Decimal>>,
) -> Result<CashFlowSeries, Box<dyn std::error::Error>> {
    Ok(CashFlowSeries::new(
        outlay.ok_or("--outlay is required (or provide --input)")?,
        flows.ok_or("--flows is required (or provide --input)")?,
    ))
}

pub fn run_irr(args: IrrArgs, config: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let series: CashFlowSeries = match input::read_request(args.input.as_deref())? {
        Some(series) => series,
        None => series_from_flags(args.outlay, args.flows)?,
    };

    let result = time_value::calculate_irr(&series, &config.irr_solver())?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a net present value
#[derive(Args)]
pub struct NpvArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Decimal discount rate per period
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<Decimal>,

    /// Initial outlay (positive)
    #[arg(long)]
    pub outlay: Option<Decimal>,

    /// Period cash flows (comma-separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub flows: Option<Vec<Decimal>>,
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: NpvRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => NpvRequest {
            rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            series: series_from_flags(args.outlay, args.flows)?,
        },
    };

    let result = time_value::calculate_npv(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for an arithmetic gradient series
#[derive(Args)]
pub struct GradientArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Payment at the end of period 1
    #[arg(long)]
    pub first_payment: Option<Decimal>,

    /// Change in payment from one period to the next
    #[arg(long, allow_hyphen_values = true)]
    pub gradient: Option<Decimal>,

    /// Rate per period, percent (10) or decimal (0.10)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of periods
    #[arg(long)]
    pub periods: Option<u32>,
}

pub fn run_gradient(args: GradientArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let gradient_input: GradientSeriesInput = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => GradientSeriesInput {
            first_payment: args
                .first_payment
                .ok_or("--first-payment is required (or provide --input)")?,
            gradient: args
                .gradient
                .ok_or("--gradient is required (or provide --input)")?,
            rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            periods: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
        },
    };

    let result = gradient::calculate_gradient_series(&gradient_input)?;
    Ok(serde_json::to_value(result)?)
}
