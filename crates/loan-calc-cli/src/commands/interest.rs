use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::interest::{
    self, CapitalizationInput, CapitalizationMethod, CompoundInterestRequest, SimpleInterestRequest,
};
use loan_calc_core::Frequency;

use super::{parse_enum, TimeArgs};
use crate::input;

/// Arguments for simple interest. Leave exactly one of capital, amount, rate
/// and the term out.
#[derive(Args)]
pub struct SimpleInterestArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Final amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Rate as a percentage per rate unit
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Unit the rate is quoted in
    #[arg(long, default_value = "annual")]
    pub rate_unit: Frequency,

    #[command(flatten)]
    pub time: TimeArgs,
}

pub fn run_simple_interest(args: SimpleInterestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SimpleInterestRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => SimpleInterestRequest {
            capital: args.capital,
            amount: args.amount,
            rate: args.rate,
            rate_unit: args.rate_unit,
            time: args.time.to_spec(),
        },
    };

    let result = interest::calculate_simple_interest(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for compound interest. Leave exactly one of capital, amount, rate
/// and the term out.
#[derive(Args)]
pub struct CompoundInterestArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Final amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Nominal rate as a percentage per rate unit
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Unit the rate is quoted in
    #[arg(long, default_value = "annual")]
    pub rate_unit: Frequency,

    /// Compounding frequency
    #[arg(long, default_value = "annual")]
    pub compounding: Frequency,

    #[command(flatten)]
    pub time: TimeArgs,
}

pub fn run_compound_interest(args: CompoundInterestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CompoundInterestRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => CompoundInterestRequest {
            capital: args.capital,
            amount: args.amount,
            rate: args.rate,
            rate_unit: args.rate_unit,
            time: args.time.to_spec(),
            compounding: args.compounding,
        },
    };

    let result = interest::calculate_compound_interest(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the accumulated amount of a capital
#[derive(Args)]
pub struct CapitalizeArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Rate as a percentage per period
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Unit shared by the rate and the periods
    #[arg(long, default_value = "annual")]
    pub unit: Frequency,

    /// Number of periods
    #[arg(long)]
    pub periods: Option<Decimal>,

    /// simple or compound
    #[arg(long, default_value = "compound", value_parser = parse_enum::<CapitalizationMethod>)]
    pub method: CapitalizationMethod,
}

pub fn run_capitalize(args: CapitalizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let capitalization: CapitalizationInput = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => CapitalizationInput {
            capital: args
                .capital
                .ok_or("--capital is required (or provide --input)")?,
            rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            unit: args.unit,
            periods: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
            method: args.method,
        },
    };

    let result = interest::calculate_capitalization(&capitalization)?;
    Ok(serde_json::to_value(result)?)
}
