//! Simple and compound interest: solve the missing one of capital, amount,
//! rate and time, plus the plain capitalization (accumulated amount) calculators.
//!
//! Rates are percentages in `rate_unit` (1.5 monthly = 18% nominal annual).

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::conversion::{periods_from_time, periods_to_time, rate_per_period_nominal, Frequency, TimeBreakdown};
use crate::error::LoanCalcError;
use crate::math::{decimal_ln, growth_factor};
use crate::types::*;
use crate::LoanCalcResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestUnknown {
    Capital,
    Amount,
    Rate,
    Time,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleInterestRequest {
    #[serde(default)]
    pub capital: Option<Money>,
    #[serde(default)]
    pub amount: Option<Money>,
    /// Percent per `rate_unit`
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub rate_unit: Frequency,
    /// All components zero means time is the unknown.
    #[serde(default)]
    pub time: TimeSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompoundInterestRequest {
    #[serde(default)]
    pub capital: Option<Money>,
    #[serde(default)]
    pub amount: Option<Money>,
    /// Percent per `rate_unit`, nominal
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub rate_unit: Frequency,
    #[serde(default)]
    pub time: TimeSpec,
    #[serde(default)]
    pub compounding: Frequency,
}

/// All four quantities after solving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestSolution {
    pub solved_for: InterestUnknown,
    pub capital: Money,
    pub amount: Money,
    pub interest: Money,
    /// Percent per `rate_unit`
    pub rate_percent: Decimal,
    pub rate_unit: Frequency,
    pub years: Decimal,
    pub time: TimeBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compounding: Option<Frequency>,
    /// Compounding periods, compound interest only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods: Option<Decimal>,
}

fn classify(
    context: &str,
    capital: Option<Money>,
    amount: Option<Money>,
    rate: Option<Decimal>,
    time: &TimeSpec,
) -> LoanCalcResult<InterestUnknown> {
    time.validate()?;
    let missing: Vec<InterestUnknown> = [
        (capital.is_none(), InterestUnknown::Capital),
        (amount.is_none(), InterestUnknown::Amount),
        (rate.is_none(), InterestUnknown::Rate),
        (time.is_empty(), InterestUnknown::Time),
    ]
    .into_iter()
    .filter_map(|(missing, field)| missing.then_some(field))
    .collect();

    if missing.len() != 1 {
        return Err(LoanCalcError::InvalidInputCount {
            context: context.into(),
            expected: "exactly one empty field among capital, amount, rate, time".into(),
            found: missing.len(),
        });
    }
    for (field, value) in [("capital", capital), ("amount", amount), ("rate", rate)] {
        if let Some(v) = value {
            require_positive(field, v)?;
        }
    }
    Ok(missing[0])
}

fn require_growth(context: &str, capital: Money, amount: Money) -> LoanCalcResult<()> {
    if amount <= capital {
        return Err(LoanCalcError::domain(
            context,
            format!("amount ({amount}) must exceed capital ({capital})"),
        ));
    }
    Ok(())
}

fn absent(field: &str) -> LoanCalcError {
    LoanCalcError::InvalidInputCount {
        context: field.into(),
        expected: "value present".into(),
        found: 0,
    }
}

// ---------------------------------------------------------------------------
// Simple interest
// ---------------------------------------------------------------------------

/// `M = C (1 + j t)` with `j` the nominal annual rate and `t` in years.
pub fn solve_simple_interest(request: &SimpleInterestRequest) -> LoanCalcResult<InterestSolution> {
    let unknown = classify(
        "simple interest",
        request.capital,
        request.amount,
        request.rate,
        &request.time,
    )?;
    let unit = request.rate_unit;
    let to_annual = |percent: Decimal| rate_per_period_nominal(&RateSpec::new(percent, unit), Frequency::Annual);
    let to_percent = |annual: Decimal| -> LoanCalcResult<Decimal> {
        div(mul(annual, dec!(100))?, unit.periods_per_year())
    };

    let (capital, amount, rate_percent, years) = match unknown {
        InterestUnknown::Amount => {
            let (c, r) = (request.capital.ok_or_else(|| absent("capital"))?, request.rate.ok_or_else(|| absent("rate"))?);
            let t = periods_from_time(&request.time, Frequency::Annual)?;
            let m = mul(c, add(Decimal::ONE, mul(to_annual(r)?, t)?)?)?;
            (c, m, r, t)
        }
        InterestUnknown::Capital => {
            let (m, r) = (request.amount.ok_or_else(|| absent("amount"))?, request.rate.ok_or_else(|| absent("rate"))?);
            let t = periods_from_time(&request.time, Frequency::Annual)?;
            (div(m, add(Decimal::ONE, mul(to_annual(r)?, t)?)?)?, m, r, t)
        }
        InterestUnknown::Rate => {
            let (c, m) = (request.capital.ok_or_else(|| absent("capital"))?, request.amount.ok_or_else(|| absent("amount"))?);
            require_growth("simple interest rate", c, m)?;
            let t = periods_from_time(&request.time, Frequency::Annual)?;
            let annual = div(m - c, mul(c, t)?)?;
            (c, m, to_percent(annual)?, t)
        }
        InterestUnknown::Time => {
            let (c, m, r) = (
                request.capital.ok_or_else(|| absent("capital"))?,
                request.amount.ok_or_else(|| absent("amount"))?,
                request.rate.ok_or_else(|| absent("rate"))?,
            );
            require_growth("simple interest time", c, m)?;
            let t = div(m - c, mul(c, to_annual(r)?)?)?;
            (c, m, r, t)
        }
    };

    Ok(InterestSolution {
        solved_for: unknown,
        capital,
        amount,
        interest: amount - capital,
        rate_percent,
        rate_unit: unit,
        years,
        time: periods_to_time(years, Frequency::Annual)?,
        compounding: None,
        periods: None,
    })
}

pub fn calculate_simple_interest(
    request: &SimpleInterestRequest,
) -> LoanCalcResult<ComputationOutput<InterestSolution>> {
    let start = Instant::now();
    let solution = solve_simple_interest(request)?;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Simple interest: M = C(1 + j t)",
        &serde_json::json!({
            "solved_for": solution.solved_for,
            "rate_unit": request.rate_unit,
            "day_count": crate::conversion::DAYS_PER_YEAR.to_string(),
        }),
        Vec::new(),
        elapsed,
        solution,
    ))
}

// ---------------------------------------------------------------------------
// Compound interest
// ---------------------------------------------------------------------------

/// `M = C (1 + i)^n`, `i` the nominal rate per compounding period and `n` the
/// number of compounding periods in `time`.
pub fn solve_compound_interest(request: &CompoundInterestRequest) -> LoanCalcResult<InterestSolution> {
    let unknown = classify(
        "compound interest",
        request.capital,
        request.amount,
        request.rate,
        &request.time,
    )?;
    let unit = request.rate_unit;
    let compounding = request.compounding;
    let ppy = compounding.periods_per_year();
    let per_period = |percent: Decimal| rate_per_period_nominal(&RateSpec::new(percent, unit), compounding);

    let (capital, amount, rate_percent, periods) = match unknown {
        InterestUnknown::Amount => {
            let (c, r) = (request.capital.ok_or_else(|| absent("capital"))?, request.rate.ok_or_else(|| absent("rate"))?);
            let n = periods_from_time(&request.time, compounding)?;
            let m = mul(c, growth_factor(per_period(r)?, n, "compound interest amount")?)?;
            (c, m, r, n)
        }
        InterestUnknown::Capital => {
            let (m, r) = (request.amount.ok_or_else(|| absent("amount"))?, request.rate.ok_or_else(|| absent("rate"))?);
            let n = periods_from_time(&request.time, compounding)?;
            let c = div(m, growth_factor(per_period(r)?, n, "compound interest capital")?)?;
            (c, m, r, n)
        }
        InterestUnknown::Rate => {
            let (c, m) = (request.capital.ok_or_else(|| absent("capital"))?, request.amount.ok_or_else(|| absent("amount"))?);
            require_growth("compound interest rate", c, m)?;
            let n = periods_from_time(&request.time, compounding)?;
            let ratio = div(m, c)?;
            let i = growth_factor(ratio - Decimal::ONE, div(Decimal::ONE, n)?, "compound interest rate")?
                - Decimal::ONE;
            // back to the requested unit, nominally
            let percent = div(mul(mul(i, ppy)?, dec!(100))?, unit.periods_per_year())?;
            (c, m, percent, n)
        }
        InterestUnknown::Time => {
            let (c, m, r) = (
                request.capital.ok_or_else(|| absent("capital"))?,
                request.amount.ok_or_else(|| absent("amount"))?,
                request.rate.ok_or_else(|| absent("rate"))?,
            );
            require_growth("compound interest time", c, m)?;
            let numerator = decimal_ln(div(m, c)?).ok_or_else(|| LoanCalcError::overflow("compound interest time"))?;
            let denominator = decimal_ln(Decimal::ONE + per_period(r)?)
                .ok_or_else(|| LoanCalcError::overflow("compound interest time"))?;
            (c, m, r, div(numerator, denominator)?)
        }
    };

    let years = periods / ppy;
    Ok(InterestSolution {
        solved_for: unknown,
        capital,
        amount,
        interest: amount - capital,
        rate_percent,
        rate_unit: unit,
        years,
        time: periods_to_time(years, Frequency::Annual)?,
        compounding: Some(compounding),
        periods: Some(periods),
    })
}

pub fn calculate_compound_interest(
    request: &CompoundInterestRequest,
) -> LoanCalcResult<ComputationOutput<InterestSolution>> {
    let start = Instant::now();
    let mut warnings = Vec::new();
    let solution = solve_compound_interest(request)?;
    if request.rate_unit != request.compounding {
        warnings.push(format!(
            "Rate quoted {} converted pro-rata to {} compounding",
            request.rate_unit, request.compounding
        ));
    }
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound interest: M = C(1 + i)^n",
        &serde_json::json!({
            "solved_for": solution.solved_for,
            "rate_unit": request.rate_unit,
            "compounding": request.compounding,
            "rate_conversion": "nominal (pro-rata)",
        }),
        warnings,
        elapsed,
        solution,
    ))
}

// ---------------------------------------------------------------------------
// Capitalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapitalizationMethod {
    #[serde(alias = "simple_capitalization")]
    Simple,
    #[default]
    #[serde(alias = "compuesta")]
    Compound,
}

/// Rate and periods share one unit: `rate` percent per period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalizationInput {
    pub capital: Money,
    pub rate: Decimal,
    #[serde(default)]
    pub unit: Frequency,
    pub periods: Periods,
    #[serde(default)]
    pub method: CapitalizationMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalizationOutput {
    pub amount: Money,
    pub interest: Money,
    pub rate_per_period: Rate,
    pub periods: Periods,
    pub method: CapitalizationMethod,
}

/// `M = P(1 + i n)` or `M = P(1 + i)^n` with `i = rate / 100`.
pub fn capitalize(input: &CapitalizationInput) -> LoanCalcResult<CapitalizationOutput> {
    require_positive("capital", input.capital)?;
    require_non_negative("periods", input.periods)?;
    let rate_per_period = rate_per_period_nominal(&RateSpec::new(input.rate, input.unit), input.unit)?;

    let factor = match input.method {
        CapitalizationMethod::Simple => add(Decimal::ONE, mul(rate_per_period, input.periods)?)?,
        CapitalizationMethod::Compound => growth_factor(rate_per_period, input.periods, "capitalization")?,
    };
    let amount = mul(input.capital, factor)?;

    Ok(CapitalizationOutput {
        amount,
        interest: amount - input.capital,
        rate_per_period,
        periods: input.periods,
        method: input.method,
    })
}

pub fn calculate_capitalization(
    input: &CapitalizationInput,
) -> LoanCalcResult<ComputationOutput<CapitalizationOutput>> {
    let start = Instant::now();
    let output = capitalize(input)?;
    let methodology = match input.method {
        CapitalizationMethod::Simple => "Simple capitalization: M = P(1 + i n)",
        CapitalizationMethod::Compound => "Compound capitalization: M = P(1 + i)^n",
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, Vec::new(), elapsed, output))
}

fn mul(a: Decimal, b: Decimal) -> LoanCalcResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| LoanCalcError::overflow("interest calculation"))
}

fn div(a: Decimal, b: Decimal) -> LoanCalcResult<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| LoanCalcError::overflow("interest calculation"))
}

fn add(a: Decimal, b: Decimal) -> LoanCalcResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| LoanCalcError::overflow("interest calculation"))
}
