use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::amortization::{self, AmortizationMethod, ScheduleInput};
use loan_calc_core::{Frequency, RateSpec};

use super::TimeArgs;
use crate::input;

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// simple, french, german, american or compound
    #[arg(long)]
    pub method: Option<AmortizationMethod>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Interest rate as a percentage (12 = 12%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Unit the rate is quoted in
    #[arg(long, default_value = "annual")]
    pub rate_unit: Frequency,

    #[command(flatten)]
    pub time: TimeArgs,

    /// Payment frequency
    #[arg(long, default_value = "monthly")]
    pub frequency: Frequency,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => ScheduleInput {
            method: args
                .method
                .ok_or("--method is required (or provide --input)")?,
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            rate: RateSpec::new(
                args.rate.ok_or("--rate is required (or provide --input)")?,
                args.rate_unit,
            ),
            time: args.time.to_spec(),
            frequency: args.frequency,
        },
    };

    let result = amortization::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
