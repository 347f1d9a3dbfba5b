use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::math::growth_factor;
use crate::types::*;
use crate::LoanCalcResult;

/// Payments `R, R + g, R + 2g, ...` at the end of periods `1..=n`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientSeriesInput {
    pub first_payment: Money,
    pub gradient: Money,
    /// Percent (12) or decimal (0.12); magnitudes above 1 are read as percent.
    pub rate: Rate,
    pub periods: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientSeriesOutput {
    pub present_value: Money,
    pub future_value: Money,
    /// Level payment with the same present value
    pub equivalent_annuity: Money,
    /// (P/A, i, n)
    pub uniform_factor: Decimal,
    /// (P/G, i, n)
    pub gradient_factor: Decimal,
    pub uniform_component: Money,
    pub gradient_component: Money,
    /// Decimal rate actually applied
    pub rate_used: Rate,
    pub last_payment: Money,
}

/// Percent-or-decimal auto detection: `|rate| > 1` means percent.
pub fn normalise_rate(rate: Rate) -> Rate {
    if rate.abs() > Decimal::ONE {
        rate / dec!(100)
    } else {
        rate
    }
}

/// `PV = R (P/A,i,n) + g (P/G,i,n)`.
pub fn gradient_present_value(input: &GradientSeriesInput) -> LoanCalcResult<GradientSeriesOutput> {
    if input.periods == 0 {
        return Err(LoanCalcError::non_positive(
            "periods",
            "A gradient series needs at least one period",
        ));
    }

    let i = normalise_rate(input.rate);
    let n = Decimal::from(input.periods);
    let growth = growth_factor(i, n, "gradient series")?;

    let (uniform_factor, gradient_factor) = if i.is_zero() {
        (n, n * (n - Decimal::ONE) / dec!(2))
    } else {
        // (P/A) = (1 - v^n) / i with v^n = 1/(1+i)^n
        let discount = div(Decimal::ONE, growth)?;
        let pa = div(Decimal::ONE - discount, i)?;
        let pg = div(pa - mul(n, discount)?, i)?;
        (pa, pg)
    };

    let uniform_component = mul(input.first_payment, uniform_factor)?;
    let gradient_component = mul(input.gradient, gradient_factor)?;
    let present_value = add(uniform_component, gradient_component)?;
    let future_value = mul(present_value, growth)?;
    let last_payment = add(input.first_payment, mul(input.gradient, n - Decimal::ONE)?)?;

    Ok(GradientSeriesOutput {
        present_value,
        future_value,
        equivalent_annuity: div(present_value, uniform_factor)?,
        uniform_factor,
        gradient_factor,
        uniform_component,
        gradient_component,
        rate_used: i,
        last_payment,
    })
}

pub fn calculate_gradient_series(
    input: &GradientSeriesInput,
) -> LoanCalcResult<ComputationOutput<GradientSeriesOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = gradient_present_value(input)?;

    if output.rate_used != input.rate {
        warnings.push(format!(
            "Rate {} read as a percentage ({} per period)",
            input.rate, output.rate_used
        ));
    }
    if output.last_payment < Decimal::ZERO {
        warnings.push("Negative gradient drives later payments below zero".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Arithmetic gradient series present value",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn mul(a: Decimal, b: Decimal) -> LoanCalcResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| LoanCalcError::overflow("gradient series"))
}

fn div(a: Decimal, b: Decimal) -> LoanCalcResult<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| LoanCalcError::overflow("gradient series"))
}

fn add(a: Decimal, b: Decimal) -> LoanCalcResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| LoanCalcError::overflow("gradient series"))
}
