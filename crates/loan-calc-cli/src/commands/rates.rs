use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::rates::{self, RateConversionRequest, RateKind, RateRelationRequest};
use loan_calc_core::Frequency;

use super::parse_enum;
use crate::input;

/// Arguments for converting a rate between kinds and frequencies
#[derive(Args)]
pub struct RateConvertArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Decimal rate to convert (0.12 = 12%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// nominal or effective
    #[arg(long, default_value = "nominal", value_parser = parse_enum::<RateKind>)]
    pub from_kind: RateKind,

    /// Compounding frequency of the input rate
    #[arg(long, default_value = "annual")]
    pub from: Frequency,

    /// nominal or effective
    #[arg(long, default_value = "effective", value_parser = parse_enum::<RateKind>)]
    pub to_kind: RateKind,

    /// Compounding frequency of the converted rate
    #[arg(long, default_value = "annual")]
    pub to: Frequency,
}

pub fn run_rate_convert(args: RateConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RateConversionRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => RateConversionRequest {
            rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            from_kind: args.from_kind,
            from: args.from,
            to_kind: args.to_kind,
            to: args.to,
        },
    };

    let result = rates::calculate_rate_conversion(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the nominal / effective / compounding-count relation.
/// Supply exactly two of the three.
#[derive(Args)]
pub struct RateRelationArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Nominal annual rate as a percentage
    #[arg(long)]
    pub nominal: Option<Decimal>,

    /// Effective annual rate as a percentage
    #[arg(long)]
    pub effective: Option<Decimal>,

    /// Compounding periods per year
    #[arg(long)]
    pub periods: Option<Decimal>,
}

pub fn run_rate_relation(args: RateRelationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RateRelationRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => RateRelationRequest {
            nominal_percent: args.nominal,
            effective_percent: args.effective,
            periods: args.periods,
        },
    };

    let result = rates::solve_rate_relation(&request)?;
    Ok(serde_json::to_value(result)?)
}
