pub mod schedules;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conversion::{periods_from_time, Frequency};
use crate::error::LoanCalcError;
use crate::math::round_half_up;
use crate::types::*;
use crate::LoanCalcResult;

pub use schedules::{
    american_schedule, compound_schedule, french_schedule, german_schedule, simple_schedule,
};

/// Amortization convention for a loan schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmortizationMethod {
    /// Flat interest on the original principal, equal instalments
    #[serde(alias = "simple_interest")]
    Simple,
    /// Constant instalment
    #[serde(alias = "frances")]
    French,
    /// Constant principal repayment
    #[serde(alias = "alemana", alias = "aleman")]
    German,
    /// Interest only, principal repaid at the final period (bullet)
    #[serde(alias = "americana", alias = "americano", alias = "bullet")]
    American,
    /// Compounded future value spread evenly over the periods
    #[serde(alias = "compuesto")]
    Compound,
}

impl AmortizationMethod {
    pub const ALL: [AmortizationMethod; 5] = [
        AmortizationMethod::Simple,
        AmortizationMethod::French,
        AmortizationMethod::German,
        AmortizationMethod::American,
        AmortizationMethod::Compound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AmortizationMethod::Simple => "simple",
            AmortizationMethod::French => "french",
            AmortizationMethod::German => "german",
            AmortizationMethod::American => "american",
            AmortizationMethod::Compound => "compound",
        }
    }
}

impl fmt::Display for AmortizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmortizationMethod {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(AmortizationMethod::Simple),
            "french" | "frances" => Ok(AmortizationMethod::French),
            "german" | "alemana" | "aleman" => Ok(AmortizationMethod::German),
            "american" | "americana" | "americano" | "bullet" => Ok(AmortizationMethod::American),
            "compound" | "compuesto" => Ok(AmortizationMethod::Compound),
            other => Err(LoanCalcError::domain(
                "amortization method",
                format!("unknown method '{other}'"),
            )),
        }
    }
}

/// One period of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Balance after this period's payment
    pub balance: Money,
}

/// A complete schedule with its totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub method: AmortizationMethod,
    pub rows: Vec<ScheduleRow>,
    pub total_payment: Money,
    pub total_interest: Money,
    /// Constant instalment, or the first one for declining schemes
    pub periodic_payment: Money,
    pub periods: u32,
    pub rate_per_period: Rate,
}

/// Everything a schedule generator needs, in one serialisable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub method: AmortizationMethod,
    pub principal: Money,
    pub rate: RateSpec,
    pub time: TimeSpec,
    #[serde(default = "default_payment_frequency")]
    pub frequency: Frequency,
}

fn default_payment_frequency() -> Frequency {
    Frequency::Monthly
}

impl ScheduleInput {
    pub fn generate(&self) -> LoanCalcResult<ScheduleResult> {
        let generator = match self.method {
            AmortizationMethod::Simple => simple_schedule,
            AmortizationMethod::French => french_schedule,
            AmortizationMethod::German => german_schedule,
            AmortizationMethod::American => american_schedule,
            AmortizationMethod::Compound => compound_schedule,
        };
        generator(self.principal, &self.rate, &self.time, self.frequency)
    }
}

/// Build a schedule for any method and wrap it in the computation envelope.
pub fn build_schedule(input: &ScheduleInput) -> LoanCalcResult<ComputationOutput<ScheduleResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let raw_periods = periods_from_time(&input.time, input.frequency)?;
    if raw_periods != round_half_up(raw_periods) {
        warnings.push(format!(
            "Fractional period count {} rounded to {}",
            raw_periods.round_dp(6),
            round_half_up(raw_periods)
        ));
    }

    let result = input.generate()?;

    if result.rate_per_period.is_zero() {
        warnings.push(zero_rate_warning(input.method).into());
    }
    if input.method == AmortizationMethod::Compound {
        warnings.push(
            "Compound schedule spreads the compounded future value evenly; it is not a standard amortization"
                .into(),
        );
    }
    if result.rows.iter().any(|r| r.principal < Decimal::ZERO) {
        warnings.push("Some periods repay negative principal (payment below interest)".into());
    }

    debug!(
        method = %input.method,
        periods = result.periods,
        total_interest = %result.total_interest,
        "schedule built"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("{} amortization schedule", methodology_label(input.method)),
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "rate": input.rate.value.to_string(),
            "rate_unit": input.rate.unit,
            "frequency": input.frequency,
            "periods": result.periods,
            "rate_per_period": result.rate_per_period.to_string(),
            "rate_conversion": "nominal (pro-rata)",
        }),
        warnings,
        elapsed,
        result,
    ))
}

fn zero_rate_warning(method: AmortizationMethod) -> &'static str {
    match method {
        AmortizationMethod::Simple | AmortizationMethod::French | AmortizationMethod::German => {
            "Zero rate: payment equals principal over periods"
        }
        AmortizationMethod::American => {
            "Zero rate: no interest accrues and the principal is repaid in the final period"
        }
        AmortizationMethod::Compound => {
            "Zero rate: future value equals principal, paid as principal over periods"
        }
    }
}

fn methodology_label(method: AmortizationMethod) -> &'static str {
    match method {
        AmortizationMethod::Simple => "Simple-interest",
        AmortizationMethod::French => "French (constant instalment)",
        AmortizationMethod::German => "German (constant principal)",
        AmortizationMethod::American => "American (bullet)",
        AmortizationMethod::Compound => "Compound-interest",
    }
}
