//! Unit conversion: quoted rates and form-style durations to the per-period
//! quantities every schedule and solver formula consumes.
//!
//! Two rate-per-period conversions live here: [`rate_per_period_nominal`]
//! (pro-rata, what the schedule generators use) and [`rate_per_period_effective`]
//! (compounding-equivalent). They give different numbers for the same input.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::math::{growth_factor, round_half_up};
use crate::types::{require_non_negative, Periods, Rate, RateSpec, TimeSpec};
use crate::LoanCalcResult;

/// Day-count basis for every daily conversion in the crate.
pub const DAYS_PER_YEAR: Decimal = dec!(365);

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Payment, compounding, or quotation frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    #[serde(alias = "anual")]
    Annual,
    #[serde(alias = "semestral")]
    Semiannual,
    #[serde(alias = "trimestral")]
    Quarterly,
    #[serde(alias = "bimestral")]
    Bimonthly,
    #[serde(alias = "mensual")]
    Monthly,
    #[serde(alias = "diaria")]
    Daily,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Annual,
        Frequency::Semiannual,
        Frequency::Quarterly,
        Frequency::Bimonthly,
        Frequency::Monthly,
        Frequency::Daily,
    ];

    pub fn periods_per_year(self) -> Decimal {
        match self {
            Frequency::Annual => dec!(1),
            Frequency::Semiannual => dec!(2),
            Frequency::Quarterly => dec!(4),
            Frequency::Bimonthly => dec!(6),
            Frequency::Monthly => dec!(12),
            Frequency::Daily => DAYS_PER_YEAR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Annual => "annual",
            Frequency::Semiannual => "semiannual",
            Frequency::Quarterly => "quarterly",
            Frequency::Bimonthly => "bimonthly",
            Frequency::Monthly => "monthly",
            Frequency::Daily => "daily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annual" | "anual" | "yearly" => Ok(Frequency::Annual),
            "semiannual" | "semestral" => Ok(Frequency::Semiannual),
            "quarterly" | "trimestral" => Ok(Frequency::Quarterly),
            "bimonthly" | "bimestral" => Ok(Frequency::Bimonthly),
            "monthly" | "mensual" => Ok(Frequency::Monthly),
            "daily" | "diaria" => Ok(Frequency::Daily),
            other => Err(LoanCalcError::domain(
                "frequency",
                format!("unknown frequency '{other}'"),
            )),
        }
    }
}

/// A period count expressed back as whole years, months and days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub years: Decimal,
    pub months: Decimal,
    pub days: Decimal,
    pub decimal_years: Decimal,
}

impl From<TimeBreakdown> for TimeSpec {
    fn from(b: TimeBreakdown) -> Self {
        TimeSpec::new(b.years, b.months, b.days)
    }
}

/// Number of `frequency` periods in `time`. May be fractional.
pub fn periods_from_time(time: &TimeSpec, frequency: Frequency) -> LoanCalcResult<Periods> {
    time.validate()?;
    let ppy = frequency.periods_per_year();
    let scaled = |value: Decimal, per_year: Decimal| value.checked_mul(ppy).map(|v| v / per_year);
    scaled(time.years, Decimal::ONE)
        .zip(scaled(time.months, MONTHS_PER_YEAR))
        .zip(scaled(time.days, DAYS_PER_YEAR))
        .and_then(|((years, months), days)| years.checked_add(months)?.checked_add(days))
        .ok_or_else(|| LoanCalcError::overflow("periods_from_time"))
}

/// Pro-rata conversion: annualise the quoted rate by simple multiplication, then
/// split it evenly across `frequency` periods. Returns a decimal rate.
pub fn rate_per_period_nominal(rate: &RateSpec, frequency: Frequency) -> LoanCalcResult<Rate> {
    require_non_negative("rate.value", rate.value)?;
    rate.value
        .checked_mul(rate.unit.periods_per_year())
        .map(|annual| annual / (frequency.periods_per_year() * dec!(100)))
        .ok_or_else(|| LoanCalcError::overflow("rate_per_period_nominal"))
}

/// Compounding conversion: the rate per `frequency` period that accumulates to the
/// same effective annual rate as the quoted one. A non-positive rate gives zero.
pub fn rate_per_period_effective(rate: &RateSpec, frequency: Frequency) -> LoanCalcResult<Rate> {
    if rate.value <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let quoted = rate.value / dec!(100);
    let effective_annual = match rate.unit {
        Frequency::Annual => quoted,
        unit => {
            growth_factor(quoted, unit.periods_per_year(), "rate_per_period_effective")?
                - Decimal::ONE
        }
    };

    match frequency {
        Frequency::Annual => Ok(effective_annual),
        target => Ok(growth_factor(
            effective_annual,
            Decimal::ONE / target.periods_per_year(),
            "rate_per_period_effective",
        )? - Decimal::ONE),
    }
}

/// Inverse of [`periods_from_time`]: whole years, whole months, rounded days.
pub fn periods_to_time(periods: Periods, frequency: Frequency) -> LoanCalcResult<TimeBreakdown> {
    require_non_negative("periods", periods)?;
    let decimal_years = periods / frequency.periods_per_year();
    let total_months = decimal_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| LoanCalcError::overflow("periods_to_time"))?
        .floor();
    let years = (total_months / MONTHS_PER_YEAR).floor();
    let months = total_months - years * MONTHS_PER_YEAR;
    let days = round_half_up((decimal_years - years - months / MONTHS_PER_YEAR) * DAYS_PER_YEAR);

    Ok(TimeBreakdown {
        years,
        months,
        days,
        decimal_years,
    })
}
