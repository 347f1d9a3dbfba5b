//! Five-variable annuity solver.
//!
//! Payment `A`, present value `P`, future value `F`, rate per period `i` and
//! period count `n`. `P` and `F` are two anchors of the same cash-flow stream
//! (`F = P(1+i)^n`), so a request supplies one of them and leaves exactly one of
//! `A`, `i`, `n` open, or supplies `A`, `i`, `n` and asks for both anchors.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LoanCalcError;
use crate::math::{decimal_ln, growth_factor};
use crate::solver::{bisection, find_root, SolverConfig, SolverMethod, SolverResult};
use crate::types::*;
use crate::LoanCalcResult;

/// Rates closer to zero than this use the `i -> 0` limits of the annuity factors.
pub const ZERO_RATE_EPSILON: Decimal = dec!(0.000000000001);

/// A payment-from-anchor inversion below this factor is treated as degenerate.
const DEGENERATE_FACTOR: Decimal = dec!(0.000000000000000001);

/// When in each period the payment falls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnuityTiming {
    /// End of period (annuity-immediate)
    #[default]
    #[serde(alias = "vencida", alias = "immediate")]
    Ordinary,
    /// Start of period (annuity-due)
    #[serde(alias = "anticipada", alias = "advance")]
    Due,
}

/// The variable a request left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnuityUnknown {
    Payment,
    Rate,
    Periods,
    /// Present and future value, both from payment, rate and periods
    Values,
}

/// Which anchor value a request supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    PresentValue,
    FutureValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnuitySolveRequest {
    #[serde(default)]
    pub payment: Option<Money>,
    #[serde(default)]
    pub present_value: Option<Money>,
    #[serde(default)]
    pub future_value: Option<Money>,
    /// Decimal rate per period (0.01 = 1%)
    #[serde(default)]
    pub rate: Option<Rate>,
    #[serde(default)]
    pub periods: Option<Periods>,
    #[serde(default)]
    pub timing: AnnuityTiming,
}

/// All five variables after solving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuitySolution {
    pub payment: Money,
    pub present_value: Money,
    pub future_value: Money,
    pub rate: Rate,
    pub periods: Periods,
    pub solved_for: AnnuityUnknown,
    pub timing: AnnuityTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverResult>,
}

/// Single-purpose future value of an ordinary annuity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnuityFutureValue {
    pub payment: Money,
    pub rate_per_period: Rate,
    pub periods: u32,
    /// (1+i)^n
    pub growth_factor: Decimal,
    pub future_value: Money,
    pub total_contributed: Money,
    pub interest_earned: Money,
    pub formula: String,
}

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

/// s(i,n) = ((1+i)^n - 1) / i, or n when |i| < 1e-12.
pub fn future_value_factor(rate: Rate, periods: Periods) -> LoanCalcResult<Decimal> {
    if rate.abs() < ZERO_RATE_EPSILON {
        return Ok(periods);
    }
    let growth = growth_factor(rate, periods, "future value factor")?;
    (growth - Decimal::ONE)
        .checked_div(rate)
        .ok_or_else(|| LoanCalcError::overflow("future value factor"))
}

/// a(i,n) = (1 - (1+i)^-n) / i, or n when |i| < 1e-12.
pub fn present_value_factor(rate: Rate, periods: Periods) -> LoanCalcResult<Decimal> {
    if rate.abs() < ZERO_RATE_EPSILON {
        return Ok(periods);
    }
    let discount = discount_factor(rate, periods)?;
    (Decimal::ONE - discount)
        .checked_div(rate)
        .ok_or_else(|| LoanCalcError::overflow("present value factor"))
}

/// (1+i)^-n. An overflowing growth factor discounts to zero.
fn discount_factor(rate: Rate, periods: Periods) -> LoanCalcResult<Decimal> {
    match growth_factor(rate, periods, "discount factor") {
        Ok(growth) => Decimal::ONE
            .checked_div(growth)
            .ok_or_else(|| LoanCalcError::overflow("discount factor")),
        Err(LoanCalcError::NumericOverflow { .. }) if periods > Decimal::ZERO => Ok(Decimal::ZERO),
        Err(e) => Err(e),
    }
}

fn timing_multiplier(rate: Rate, timing: AnnuityTiming) -> Decimal {
    match timing {
        AnnuityTiming::Ordinary => Decimal::ONE,
        AnnuityTiming::Due => Decimal::ONE + rate,
    }
}

/// Factor linking the payment to `anchor`, annuity-due adjustment included.
fn anchor_factor(
    anchor: Anchor,
    timing: AnnuityTiming,
    rate: Rate,
    periods: Periods,
) -> LoanCalcResult<Decimal> {
    let base = match anchor {
        Anchor::PresentValue => present_value_factor(rate, periods)?,
        Anchor::FutureValue => future_value_factor(rate, periods)?,
    };
    base.checked_mul(timing_multiplier(rate, timing))
        .ok_or_else(|| LoanCalcError::overflow("annuity factor"))
}

/// d/di of [`anchor_factor`].
fn anchor_factor_derivative(
    anchor: Anchor,
    timing: AnnuityTiming,
    rate: Rate,
    periods: Periods,
) -> LoanCalcResult<Decimal> {
    let n = periods;
    let base_derivative = if rate.abs() < ZERO_RATE_EPSILON {
        let doubled = match anchor {
            Anchor::FutureValue => n.checked_mul(n - Decimal::ONE),
            Anchor::PresentValue => n.checked_mul(n + Decimal::ONE).map(|v| -v),
        };
        doubled
            .map(|v| v / dec!(2))
            .ok_or_else(|| LoanCalcError::overflow("annuity factor derivative"))?
    } else {
        let i = rate;
        let (power, level) = match anchor {
            Anchor::FutureValue => (
                growth_factor(i, n - Decimal::ONE, "future value factor derivative")?,
                growth_factor(i, n, "future value factor derivative")? - Decimal::ONE,
            ),
            Anchor::PresentValue => (
                discount_factor(i, n + Decimal::ONE)?,
                Decimal::ONE - discount_factor(i, n)?,
            ),
        };
        // (n * power * i - level) / i^2
        n.checked_mul(power)
            .and_then(|v| v.checked_mul(i))
            .and_then(|v| v.checked_sub(level))
            .and_then(|v| i.checked_mul(i).and_then(|square| v.checked_div(square)))
            .ok_or_else(|| LoanCalcError::overflow("annuity factor derivative"))?
    };

    match timing {
        AnnuityTiming::Ordinary => Ok(base_derivative),
        AnnuityTiming::Due => {
            let base = match anchor {
                Anchor::PresentValue => present_value_factor(rate, periods)?,
                Anchor::FutureValue => future_value_factor(rate, periods)?,
            };
            base_derivative
                .checked_mul(Decimal::ONE + rate)
                .and_then(|v| v.checked_add(base))
                .ok_or_else(|| LoanCalcError::overflow("annuity factor derivative"))
        }
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Solve with the default rate-solver settings.
pub fn solve_annuity(request: &AnnuitySolveRequest) -> LoanCalcResult<AnnuitySolution> {
    solve_annuity_with(request, &SolverConfig::annuity_rate())
}

/// Solve the open variable of `request`, using `config` when the rate is open.
pub fn solve_annuity_with(
    request: &AnnuitySolveRequest,
    config: &SolverConfig,
) -> LoanCalcResult<AnnuitySolution> {
    validate_request(request)?;
    let unknown = classify(request)?;
    let timing = request.timing;

    if unknown == AnnuityUnknown::Values {
        let (payment, rate, periods) = match (request.payment, request.rate, request.periods) {
            (Some(a), Some(i), Some(n)) => (a, i, n),
            _ => return Err(count_error(request)),
        };
        let present_value = mul(payment, anchor_factor(Anchor::PresentValue, timing, rate, periods)?)?;
        let future_value = mul(payment, anchor_factor(Anchor::FutureValue, timing, rate, periods)?)?;
        return Ok(AnnuitySolution {
            payment,
            present_value,
            future_value,
            rate,
            periods,
            solved_for: unknown,
            timing,
            solver: None,
        });
    }

    let (anchor, target) = match (request.present_value, request.future_value) {
        (Some(p), None) => (Anchor::PresentValue, p),
        (None, Some(f)) => (Anchor::FutureValue, f),
        _ => return Err(count_error(request)),
    };

    let mut solver = None;
    let (payment, rate, periods) = match (request.payment, request.rate, request.periods) {
        (None, Some(i), Some(n)) => (solve_payment(anchor, timing, target, i, n)?, i, n),
        (Some(a), None, Some(n)) => {
            let result = solve_rate(anchor, timing, target, a, n, config)?;
            solver = Some(result);
            (a, result.root, n)
        }
        (Some(a), Some(i), None) => (a, i, solve_periods(anchor, timing, target, a, i)?),
        _ => return Err(count_error(request)),
    };

    let (present_value, future_value) = match anchor {
        Anchor::PresentValue => (target, mul(target, growth_factor(rate, periods, "annuity future value")?)?),
        Anchor::FutureValue => (mul(target, discount_factor(rate, periods)?)?, target),
    };

    Ok(AnnuitySolution {
        payment,
        present_value,
        future_value,
        rate,
        periods,
        solved_for: unknown,
        timing,
        solver,
    })
}

/// [`solve_annuity_with`] wrapped in the computation envelope.
pub fn calculate_annuity(
    request: &AnnuitySolveRequest,
    config: &SolverConfig,
) -> LoanCalcResult<ComputationOutput<AnnuitySolution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let solution = solve_annuity_with(request, config)?;

    if solution.rate.abs() < ZERO_RATE_EPSILON {
        warnings.push("Rate below 1e-12: zero-rate limits used (F = P = A * n)".into());
    }
    if let Some(s) = &solution.solver {
        if s.method == SolverMethod::Bisection {
            warnings.push(format!(
                "Newton-Raphson did not converge; rate found by bisection after {} iterations",
                s.iterations
            ));
        }
    }
    if solution.solved_for == AnnuityUnknown::Periods && !solution.periods.fract().is_zero() {
        warnings.push(format!(
            "Solved period count {} is not a whole number",
            solution.periods.round_dp(6)
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Annuity solver ({:?} annuity)", solution.timing),
        &serde_json::json!({
            "solved_for": solution.solved_for,
            "timing": solution.timing,
            "rate_basis": "decimal rate per period",
            "zero_rate_epsilon": ZERO_RATE_EPSILON.to_string(),
            "solver": config,
        }),
        warnings,
        elapsed,
        solution,
    ))
}

fn validate_request(request: &AnnuitySolveRequest) -> LoanCalcResult<()> {
    for (field, value) in [
        ("payment", request.payment),
        ("present_value", request.present_value),
        ("future_value", request.future_value),
        ("periods", request.periods),
    ] {
        if let Some(v) = value {
            require_positive(field, v)?;
        }
    }
    if let Some(rate) = request.rate {
        if rate <= dec!(-1) {
            return Err(LoanCalcError::domain(
                "annuity",
                format!("rate per period must be greater than -1 (got {rate})"),
            ));
        }
    }
    Ok(())
}

fn unknown_count(request: &AnnuitySolveRequest) -> usize {
    [
        request.payment.is_none(),
        request.present_value.is_none(),
        request.future_value.is_none(),
        request.rate.is_none(),
        request.periods.is_none(),
    ]
    .iter()
    .filter(|missing| **missing)
    .count()
}

fn count_error(request: &AnnuitySolveRequest) -> LoanCalcError {
    LoanCalcError::InvalidInputCount {
        context: "annuity".into(),
        expected: "one of payment/rate/periods open with exactly one of present_value/future_value, \
                   or payment, rate and periods with both values open"
            .into(),
        found: unknown_count(request),
    }
}

fn classify(request: &AnnuitySolveRequest) -> LoanCalcResult<AnnuityUnknown> {
    let anchors = usize::from(request.present_value.is_some()) + usize::from(request.future_value.is_some());
    let open: Vec<AnnuityUnknown> = [
        (request.payment.is_none(), AnnuityUnknown::Payment),
        (request.rate.is_none(), AnnuityUnknown::Rate),
        (request.periods.is_none(), AnnuityUnknown::Periods),
    ]
    .into_iter()
    .filter_map(|(missing, unknown)| missing.then_some(unknown))
    .collect();

    match (open.as_slice(), anchors) {
        ([], 0) => Ok(AnnuityUnknown::Values),
        ([single], 1) => Ok(*single),
        _ => Err(count_error(request)),
    }
}

fn mul(a: Decimal, b: Decimal) -> LoanCalcResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| LoanCalcError::overflow("annuity value"))
}

fn div(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| LoanCalcError::overflow(context))
}

fn solve_payment(
    anchor: Anchor,
    timing: AnnuityTiming,
    target: Money,
    rate: Rate,
    periods: Periods,
) -> LoanCalcResult<Money> {
    let factor = anchor_factor(anchor, timing, rate, periods)?;
    if factor.abs() < DEGENERATE_FACTOR {
        return Err(LoanCalcError::domain(
            "annuity payment",
            format!("annuity factor is effectively zero at rate {rate}"),
        ));
    }
    div(target, factor, "annuity payment")
}

fn solve_periods(
    anchor: Anchor,
    timing: AnnuityTiming,
    target: Money,
    payment: Money,
    rate: Rate,
) -> LoanCalcResult<Periods> {
    let periods = if rate.abs() < ZERO_RATE_EPSILON {
        div(target, payment, "annuity periods")?
    } else {
        let adjusted = div(target, timing_multiplier(rate, timing), "annuity periods")?;
        let ratio = adjusted
            .checked_mul(rate)
            .and_then(|v| v.checked_div(payment))
            .ok_or_else(|| LoanCalcError::overflow("annuity periods"))?;
        let (argument, sign) = match anchor {
            Anchor::PresentValue => (Decimal::ONE - ratio, Decimal::NEGATIVE_ONE),
            Anchor::FutureValue => (Decimal::ONE + ratio, Decimal::ONE),
        };
        if argument <= Decimal::ZERO {
            return Err(LoanCalcError::domain(
                "annuity periods",
                format!(
                    "logarithm argument {} is not positive; payment {payment} cannot carry this balance at rate {rate}",
                    argument.round_dp(10)
                ),
            ));
        }
        let numerator =
            decimal_ln(argument).ok_or_else(|| LoanCalcError::overflow("annuity periods"))?;
        let denominator = decimal_ln(Decimal::ONE + rate)
            .ok_or_else(|| LoanCalcError::overflow("annuity periods"))?;
        sign * div(numerator, denominator, "annuity periods")?
    };

    if periods <= Decimal::ZERO {
        return Err(LoanCalcError::domain(
            "annuity periods",
            format!("computed period count {periods} is not positive"),
        ));
    }
    Ok(periods)
}

fn solve_rate(
    anchor: Anchor,
    timing: AnnuityTiming,
    target: Money,
    payment: Money,
    periods: Periods,
    config: &SolverConfig,
) -> LoanCalcResult<SolverResult> {
    // Overflow saturates to Decimal::MAX.
    let objective = |i: Rate| -> LoanCalcResult<Decimal> {
        match anchor_factor(anchor, timing, i, periods) {
            Ok(factor) => Ok(payment
                .checked_mul(factor)
                .map_or(Decimal::MAX, |value| value - target)),
            Err(LoanCalcError::NumericOverflow { .. }) => Ok(Decimal::MAX),
            Err(e) => Err(e),
        }
    };
    let derivative = |i: Rate| -> LoanCalcResult<Decimal> {
        let d = anchor_factor_derivative(anchor, timing, i, periods)?;
        payment
            .checked_mul(d)
            .ok_or_else(|| LoanCalcError::overflow("annuity rate derivative"))
    };

    let result = find_root(&objective, &derivative, config)?;
    if result.root > Decimal::ZERO {
        return Ok(result);
    }

    match &config.bracket {
        Some(bracket) => {
            debug!(root = %result.root, "non-positive rate from newton-raphson, bisecting");
            bisection(&objective, bracket)
        }
        None => {
            warn!(root = %result.root, "annuity rate solver produced a non-positive rate");
            Err(LoanCalcError::domain(
                "annuity rate",
                format!("rate not solvable: solver settled on {}", result.root),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Future value of an ordinary annuity
// ---------------------------------------------------------------------------

/// `F = A((1+i)^n - 1)/i` with `i = rate_percent / 100` and a whole number of
/// periods. `|i| < 1e-12` gives `A * n`.
pub fn annuity_future_value(
    payment: Money,
    rate_percent: Decimal,
    periods: u32,
) -> LoanCalcResult<AnnuityFutureValue> {
    require_positive("payment", payment)?;
    if periods == 0 {
        return Err(LoanCalcError::non_positive(
            "periods",
            "Number of periods must be a whole number greater than zero",
        ));
    }

    let rate = rate_percent / dec!(100);
    let n = Decimal::from(periods);
    let (growth, formula) = if rate.abs() < ZERO_RATE_EPSILON {
        (Decimal::ONE, "F = A * n (zero-rate limit)")
    } else {
        (
            growth_factor(rate, n, "annuity future value")?,
            "F = A * ((1 + i)^n - 1) / i",
        )
    };
    let future_value = mul(payment, future_value_factor(rate, n)?)?;
    let total_contributed = mul(payment, n)?;

    Ok(AnnuityFutureValue {
        payment,
        rate_per_period: rate,
        periods,
        growth_factor: growth,
        future_value,
        total_contributed,
        interest_earned: future_value - total_contributed,
        formula: formula.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TOL: Decimal = dec!(0.000001);

    fn request() -> AnnuitySolveRequest {
        AnnuitySolveRequest::default()
    }

    #[test]
    fn test_future_value_from_payment() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            rate: Some(dec!(0.01)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap();
        assert_eq!(sol.solved_for, AnnuityUnknown::Values);
        assert!((sol.future_value - dec!(1268.2503013196972066)).abs() < TOL);
        assert!((sol.present_value - dec!(1125.5077473484630206)).abs() < TOL);
    }

    #[test]
    fn test_due_multiplies_by_one_plus_rate() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            rate: Some(dec!(0.01)),
            periods: Some(dec!(12)),
            timing: AnnuityTiming::Due,
            ..request()
        })
        .unwrap();
        assert!((sol.future_value - dec!(1280.9328043328941787)).abs() < TOL);
        assert!((sol.present_value - dec!(1136.7628248219476508)).abs() < TOL);
    }

    #[test]
    fn test_payment_from_present_value() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            present_value: Some(dec!(1000000)),
            rate: Some(dec!(0.01)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap();
        assert_eq!(sol.solved_for, AnnuityUnknown::Payment);
        assert_eq!(sol.payment.round_dp(2), dec!(88848.79));
        // F = P * 1.01^12
        assert!((sol.future_value - dec!(1126825.030131969720661201)).abs() < TOL);
    }

    #[test]
    fn test_payment_round_trip_through_future_value() {
        let forward = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(250)),
            rate: Some(dec!(0.0075)),
            periods: Some(dec!(48)),
            ..request()
        })
        .unwrap();
        let back = solve_annuity(&AnnuitySolveRequest {
            future_value: Some(forward.future_value),
            rate: Some(dec!(0.0075)),
            periods: Some(dec!(48)),
            ..request()
        })
        .unwrap();
        assert!(((back.payment - dec!(250)) / dec!(250)).abs() < TOL);
    }

    #[test]
    fn test_zero_rate_limit_exact() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            rate: Some(Decimal::ZERO),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap();
        assert_eq!(sol.future_value, dec!(1200));
        assert_eq!(sol.present_value, dec!(1200));
    }

    #[test]
    fn test_tiny_rates_approach_limit() {
        for rate in [dec!(0.0000000001), dec!(-0.0000000001)] {
            let sol = solve_annuity(&AnnuitySolveRequest {
                payment: Some(dec!(100)),
                rate: Some(rate),
                periods: Some(dec!(12)),
                ..request()
            })
            .unwrap();
            assert!((sol.future_value - dec!(1200)).abs() < TOL, "rate {rate}");
            assert!((sol.present_value - dec!(1200)).abs() < TOL, "rate {rate}");
        }
    }

    #[test]
    fn test_rate_from_future_value() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            future_value: Some(dec!(1268.2503013196972066)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap();
        assert_eq!(sol.solved_for, AnnuityUnknown::Rate);
        assert!((sol.rate - dec!(0.01)).abs() < dec!(0.000000001), "got {}", sol.rate);
        assert!(sol.solver.is_some());
    }

    #[test]
    fn test_rate_from_present_value_due() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            present_value: Some(dec!(1136.7628248219476508)),
            periods: Some(dec!(12)),
            timing: AnnuityTiming::Due,
            ..request()
        })
        .unwrap();
        assert!((sol.rate - dec!(0.01)).abs() < dec!(0.000000001), "got {}", sol.rate);
    }

    #[test]
    fn test_rate_not_solvable_when_payments_exceed_target() {
        // 12 * 100 already exceeds F = 1000, so only a negative rate fits.
        let err = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            future_value: Some(dec!(1000)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::NonConvergence { .. }));
    }

    #[test]
    fn test_periods_from_present_value() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(88848.78867834170734)),
            present_value: Some(dec!(1000000)),
            rate: Some(dec!(0.01)),
            ..request()
        })
        .unwrap();
        assert_eq!(sol.solved_for, AnnuityUnknown::Periods);
        assert!((sol.periods - dec!(12)).abs() < TOL, "got {}", sol.periods);
    }

    #[test]
    fn test_periods_from_future_value_due() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            future_value: Some(dec!(1280.9328043328941787)),
            rate: Some(dec!(0.01)),
            timing: AnnuityTiming::Due,
            ..request()
        })
        .unwrap();
        assert!((sol.periods - dec!(12)).abs() < TOL, "got {}", sol.periods);
    }

    #[test]
    fn test_periods_zero_rate_degrades() {
        let sol = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(50)),
            present_value: Some(dec!(1000)),
            rate: Some(Decimal::ZERO),
            ..request()
        })
        .unwrap();
        assert_eq!(sol.periods, dec!(20));
    }

    #[test]
    fn test_periods_payment_too_small() {
        // interest alone (10000) exceeds the payment
        let err = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(5000)),
            present_value: Some(dec!(1000000)),
            rate: Some(dec!(0.01)),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::DomainError { .. }));
    }

    #[test]
    fn test_all_five_supplied_rejected() {
        let err = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(100)),
            present_value: Some(dec!(1000)),
            future_value: Some(dec!(1200)),
            rate: Some(dec!(0.01)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap_err();
        match err {
            LoanCalcError::InvalidInputCount { found, .. } => assert_eq!(found, 0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_two_unknowns_rejected() {
        let err = solve_annuity(&AnnuitySolveRequest {
            present_value: Some(dec!(1000)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::InvalidInputCount { .. }));
    }

    #[test]
    fn test_both_anchors_while_solving_payment_rejected() {
        let err = solve_annuity(&AnnuitySolveRequest {
            present_value: Some(dec!(1000)),
            future_value: Some(dec!(1200)),
            rate: Some(dec!(0.01)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::InvalidInputCount { .. }));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let err = solve_annuity(&AnnuitySolveRequest {
            payment: Some(dec!(-100)),
            rate: Some(dec!(0.01)),
            periods: Some(dec!(12)),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::NonPositiveValue { .. }));
    }

    #[test]
    fn test_envelope_reports_solver() {
        let out = calculate_annuity(
            &AnnuitySolveRequest {
                payment: Some(dec!(100)),
                rate: Some(Decimal::ZERO),
                periods: Some(dec!(12)),
                ..request()
            },
            &SolverConfig::annuity_rate(),
        )
        .unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("zero-rate")));
        assert_eq!(out.assumptions["solved_for"], "values");
    }

    #[test]
    fn test_single_purpose_future_value() {
        let fv = annuity_future_value(dec!(100), dec!(1), 12).unwrap();
        assert!((fv.future_value - dec!(1268.2503013196972066)).abs() < TOL);
        assert_eq!(fv.total_contributed, dec!(1200));
        assert!((fv.interest_earned - dec!(68.2503013196972066)).abs() < TOL);

        let flat = annuity_future_value(dec!(100), Decimal::ZERO, 12).unwrap();
        assert_eq!(flat.future_value, dec!(1200));
        assert_eq!(flat.growth_factor, Decimal::ONE);
    }

    #[test]
    fn test_single_purpose_future_value_rejects_zero_periods() {
        assert!(annuity_future_value(dec!(100), dec!(1), 0).is_err());
    }

    #[test]
    fn test_payment_beyond_decimal_range_is_overflow() {
        let err = solve_annuity(&AnnuitySolveRequest {
            present_value: Some(dec!(100000000000000000000)),
            rate: Some(dec!(1000000000000000)),
            periods: Some(Decimal::ONE),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::NumericOverflow { .. }), "got {err:?}");
    }

    #[test]
    fn test_periods_for_vanishing_payment_is_overflow() {
        let err = solve_annuity(&AnnuitySolveRequest {
            present_value: Some(dec!(1000000000000)),
            rate: Some(dec!(0.01)),
            payment: Some(dec!(0.00000000000000000001)),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::NumericOverflow { .. }), "got {err:?}");
    }
}
