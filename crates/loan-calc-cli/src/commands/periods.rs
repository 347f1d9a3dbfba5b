use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use loan_calc_core::conversion::{periods_from_time, periods_to_time, TimeBreakdown};
use loan_calc_core::{Frequency, TimeSpec};

use super::TimeArgs;
use crate::input;

/// Arguments for converting a term into a period count, or back with --periods
#[derive(Args)]
pub struct PeriodsArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub time: TimeArgs,

    /// Period count to express as years, months and days instead
    #[arg(long)]
    pub periods: Option<Decimal>,

    /// Period length
    #[arg(long, default_value = "monthly")]
    pub frequency: Frequency,
}

#[derive(Debug, Deserialize)]
struct PeriodsRequest {
    #[serde(default)]
    time: Option<TimeSpec>,
    #[serde(default)]
    periods: Option<Decimal>,
    #[serde(default)]
    frequency: Frequency,
}

#[derive(Debug, Serialize)]
struct PeriodsOutput {
    frequency: Frequency,
    periods: Decimal,
    time: TimeBreakdown,
}

pub fn run_periods(args: PeriodsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PeriodsRequest = match input::read_request(args.input.as_deref())? {
        Some(request) => request,
        None => PeriodsRequest {
            time: Some(args.time.to_spec()).filter(|t| !t.is_empty()),
            periods: args.periods,
            frequency: args.frequency,
        },
    };

    let periods = match (request.periods, request.time) {
        (Some(periods), None) => periods,
        (None, Some(time)) => periods_from_time(&time, request.frequency)?,
        _ => return Err("give either a term (--years/--months/--days) or --periods".into()),
    };

    let output = PeriodsOutput {
        frequency: request.frequency,
        periods,
        time: periods_to_time(periods, request.frequency)?,
    };
    Ok(serde_json::to_value(output)?)
}
