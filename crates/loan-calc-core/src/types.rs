use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::conversion::Frequency;
use crate::error::LoanCalcError;
use crate::LoanCalcResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.01 = 1% per period) unless a field says otherwise.
pub type Rate = Decimal;

/// Period counts. Fractional where the calculator tolerates it.
pub type Periods = Decimal;

/// A quoted interest rate: a percentage magnitude (12 = 12%) and the unit it is
/// quoted in (12% annual, 1.5% monthly, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSpec {
    pub value: Decimal,
    #[serde(default)]
    pub unit: Frequency,
}

impl RateSpec {
    pub fn new(value: Decimal, unit: Frequency) -> Self {
        Self { value, unit }
    }

    pub fn annual(value: Decimal) -> Self {
        Self::new(value, Frequency::Annual)
    }
}

/// A duration broken down the way a loan form collects it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSpec {
    #[serde(default)]
    pub years: Decimal,
    #[serde(default)]
    pub months: Decimal,
    #[serde(default)]
    pub days: Decimal,
}

impl TimeSpec {
    pub fn new(years: Decimal, months: Decimal, days: Decimal) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn from_years(years: Decimal) -> Self {
        Self::new(years, Decimal::ZERO, Decimal::ZERO)
    }

    pub fn from_months(months: Decimal) -> Self {
        Self::new(Decimal::ZERO, months, Decimal::ZERO)
    }

    pub fn from_days(days: Decimal) -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, days)
    }

    /// True when no component carries any time.
    pub fn is_empty(&self) -> bool {
        self.years <= Decimal::ZERO && self.months <= Decimal::ZERO && self.days <= Decimal::ZERO
    }

    pub fn validate(&self) -> LoanCalcResult<()> {
        for (field, value) in [
            ("time.years", self.years),
            ("time.months", self.months),
            ("time.days", self.days),
        ] {
            if value < Decimal::ZERO {
                return Err(LoanCalcError::non_positive(
                    field,
                    "Time components cannot be negative",
                ));
            }
        }
        Ok(())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Reject zero and negative values for a field whose formula divides by it.
pub(crate) fn require_positive(field: &str, value: Decimal) -> LoanCalcResult<()> {
    if value <= Decimal::ZERO {
        return Err(LoanCalcError::non_positive(
            field,
            &format!("{field} must be greater than zero (got {value})"),
        ));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: Decimal) -> LoanCalcResult<()> {
    if value < Decimal::ZERO {
        return Err(LoanCalcError::non_positive(
            field,
            &format!("{field} cannot be negative (got {value})"),
        ));
    }
    Ok(())
}
