//! Root finding shared by the annuity rate branch and IRR.
//!
//! - [`newton_raphson`]: analytic derivative supplied by the caller
//! - [`newton_raphson_numerical`]: forward-difference derivative
//! - [`bisection`]: bracketing with geometric expansion of the upper bound
//! - [`find_root`] / [`find_root_numerical`]: Newton first, bisection fallback when
//!   the config carries a bracket
//!
//! Objective functions return `LoanCalcResult` so domain and overflow failures
//! inside an evaluation surface as errors instead of NaN.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::LoanCalcError;
use crate::LoanCalcResult;

/// Below this a Newton step is treated as a flat derivative.
const DERIVATIVE_FLOOR: Decimal = dec!(0.00000000000000000001);

/// When an iteration counts as converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convergence {
    /// |f(x)| < tolerance
    Residual,
    /// |x_next - x| < tolerance
    Step,
}

/// Bisection fallback interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower: Decimal,
    pub upper: Decimal,
    /// Times the upper bound may be doubled looking for a sign change.
    pub expansions: u32,
    pub iterations: u32,
    pub tolerance: Decimal,
}

impl Default for Bracket {
    fn default() -> Self {
        Self {
            lower: dec!(0.000000000001),
            upper: dec!(10),
            expansions: 10,
            iterations: 200,
            tolerance: dec!(0.000000000001),
        }
    }
}

/// Configuration for [`find_root`] and friends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub seed: Decimal,
    pub tolerance: Decimal,
    pub max_iterations: u32,
    pub convergence: Convergence,
    /// Forward-difference step for the numerical derivative.
    pub derivative_step: Decimal,
    #[serde(default)]
    pub bracket: Option<Bracket>,
}

impl SolverConfig {
    /// Annuity rate solving: seed 1%, |f| < 1e-10, 100 Newton iterations, then
    /// bisection on [1e-12, 10].
    pub fn annuity_rate() -> Self {
        Self {
            seed: dec!(0.01),
            tolerance: dec!(0.0000000001),
            max_iterations: 100,
            convergence: Convergence::Residual,
            derivative_step: dec!(0.00001),
            bracket: Some(Bracket::default()),
        }
    }

    /// IRR: seed 10%, successive estimates within 1e-7, 1000 iterations, no fallback.
    pub fn irr() -> Self {
        Self {
            seed: dec!(0.10),
            tolerance: dec!(0.0000001),
            max_iterations: 1000,
            convergence: Convergence::Step,
            derivative_step: dec!(0.00001),
            bracket: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Decimal) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_bracket(mut self, bracket: Option<Bracket>) -> Self {
        self.bracket = bracket;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::annuity_rate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    NewtonRaphson,
    Bisection,
}

/// Result of a root-finding run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub root: Decimal,
    pub iterations: u32,
    /// f(root)
    pub residual: Decimal,
    pub method: SolverMethod,
}

/// Newton-Raphson with an analytic derivative.
pub fn newton_raphson<F, D>(f: F, df: D, config: &SolverConfig) -> LoanCalcResult<SolverResult>
where
    F: Fn(Decimal) -> LoanCalcResult<Decimal>,
    D: Fn(Decimal) -> LoanCalcResult<Decimal>,
{
    newton_core(&f, &|x, _fx| df(x), config)
}

/// Newton-Raphson with a forward-difference derivative (step `config.derivative_step`).
pub fn newton_raphson_numerical<F>(f: F, config: &SolverConfig) -> LoanCalcResult<SolverResult>
where
    F: Fn(Decimal) -> LoanCalcResult<Decimal>,
{
    let h = config.derivative_step;
    newton_core(&f, &|x, fx| Ok((f(x + h)? - fx) / h), config)
}

/// Newton-Raphson, falling back to [`bisection`] when Newton fails and the config
/// carries a bracket.
pub fn find_root<F, D>(f: F, df: D, config: &SolverConfig) -> LoanCalcResult<SolverResult>
where
    F: Fn(Decimal) -> LoanCalcResult<Decimal>,
    D: Fn(Decimal) -> LoanCalcResult<Decimal>,
{
    match newton_raphson(&f, &df, config) {
        Ok(result) => Ok(result),
        Err(e) => fallback(&f, config, e),
    }
}

/// [`find_root`] with a forward-difference derivative.
pub fn find_root_numerical<F>(f: F, config: &SolverConfig) -> LoanCalcResult<SolverResult>
where
    F: Fn(Decimal) -> LoanCalcResult<Decimal>,
{
    match newton_raphson_numerical(&f, config) {
        Ok(result) => Ok(result),
        Err(e) => fallback(&f, config, e),
    }
}

/// Bisection on `[bracket.lower, bracket.upper]`. When the endpoints share a sign
/// the upper bound is doubled, at most `bracket.expansions` times.
pub fn bisection<F>(f: F, bracket: &Bracket) -> LoanCalcResult<SolverResult>
where
    F: Fn(Decimal) -> LoanCalcResult<Decimal>,
{
    let mut lo = bracket.lower;
    let mut hi = bracket.upper;
    let mut f_lo = f(lo)?;
    let mut f_hi = f(hi)?;

    if f_lo.is_zero() {
        return Ok(bisection_result(lo, 0, f_lo));
    }

    let mut expansions = 0;
    while same_sign(f_lo, f_hi) {
        if expansions >= bracket.expansions {
            return Err(LoanCalcError::NonConvergence {
                function: "bisection (no sign change in bracket)".into(),
                iterations: 0,
                last_delta: f_hi,
            });
        }
        hi *= dec!(2);
        f_hi = f(hi)?;
        expansions += 1;
        trace!(upper = %hi, "expanded bisection bracket");
    }

    let mut mid = lo;
    let mut f_mid = f_lo;
    for iteration in 1..=bracket.iterations {
        mid = (lo + hi) / dec!(2);
        f_mid = f(mid)?;
        if f_mid.is_zero() || (hi - lo) / dec!(2) < bracket.tolerance {
            debug!(iterations = iteration, root = %mid, "bisection converged");
            return Ok(bisection_result(mid, iteration, f_mid));
        }
        if same_sign(f_mid, f_lo) {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Err(LoanCalcError::NonConvergence {
        function: format!("bisection near {mid}"),
        iterations: bracket.iterations,
        last_delta: f_mid,
    })
}

fn newton_core<F, D>(f: &F, derivative: &D, config: &SolverConfig) -> LoanCalcResult<SolverResult>
where
    F: Fn(Decimal) -> LoanCalcResult<Decimal>,
    D: Fn(Decimal, Decimal) -> LoanCalcResult<Decimal>,
{
    let mut x = config.seed;
    let mut fx = Decimal::ZERO;

    for iteration in 0..config.max_iterations {
        fx = f(x)?;
        if fx.is_zero()
            || (config.convergence == Convergence::Residual && fx.abs() < config.tolerance)
        {
            debug!(iterations = iteration, root = %x, "newton-raphson converged");
            return Ok(newton_result(x, iteration, fx));
        }

        let dfx = derivative(x, fx)?;
        if dfx.abs() < DERIVATIVE_FLOOR {
            return Err(LoanCalcError::NonConvergence {
                function: "newton-raphson (flat derivative)".into(),
                iterations: iteration,
                last_delta: fx,
            });
        }

        let step = fx
            .checked_div(dfx)
            .ok_or_else(|| LoanCalcError::overflow("newton-raphson step"))?;
        let next = x
            .checked_sub(step)
            .ok_or_else(|| LoanCalcError::overflow("newton-raphson step"))?;
        trace!(iteration, x = %next, residual = %fx, "newton-raphson step");

        if config.convergence == Convergence::Step && step.abs() < config.tolerance {
            let residual = f(next)?;
            debug!(iterations = iteration + 1, root = %next, "newton-raphson converged");
            return Ok(newton_result(next, iteration + 1, residual));
        }
        x = next;
    }

    Err(LoanCalcError::NonConvergence {
        function: "newton-raphson".into(),
        iterations: config.max_iterations,
        last_delta: fx,
    })
}

fn fallback<F>(f: &F, config: &SolverConfig, newton_error: LoanCalcError) -> LoanCalcResult<SolverResult>
where
    F: Fn(Decimal) -> LoanCalcResult<Decimal>,
{
    match &config.bracket {
        Some(bracket) => {
            debug!(error = %newton_error, "newton-raphson failed, falling back to bisection");
            bisection(f, bracket)
        }
        None => Err(newton_error),
    }
}

fn same_sign(a: Decimal, b: Decimal) -> bool {
    !a.is_zero() && !b.is_zero() && a.is_sign_negative() == b.is_sign_negative()
}

fn newton_result(root: Decimal, iterations: u32, residual: Decimal) -> SolverResult {
    SolverResult {
        root,
        iterations,
        residual,
        method: SolverMethod::NewtonRaphson,
    }
}

fn bisection_result(root: Decimal, iterations: u32, residual: Decimal) -> SolverResult {
    SolverResult {
        root,
        iterations,
        residual,
        method: SolverMethod::Bisection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_minus(target: Decimal) -> impl Fn(Decimal) -> LoanCalcResult<Decimal> {
        move |x| Ok(x * x - target)
    }

    #[test]
    fn test_newton_sqrt_two() {
        let result = newton_raphson(
            square_minus(dec!(2)),
            |x| Ok(dec!(2) * x),
            &SolverConfig::annuity_rate().with_seed(dec!(1.5)),
        )
        .unwrap();
        assert!((result.root - dec!(1.4142135623730950488)).abs() < dec!(0.0000000001));
        assert_eq!(result.method, SolverMethod::NewtonRaphson);
    }

    #[test]
    fn test_numerical_newton_step_convergence() {
        let result =
            newton_raphson_numerical(square_minus(dec!(9)), &SolverConfig::irr().with_seed(dec!(1)))
                .unwrap();
        assert!((result.root - dec!(3)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_flat_derivative_falls_back_to_bisection() {
        // f'(0) = 0, so Newton cannot start from the seed
        let config = SolverConfig::annuity_rate().with_seed(Decimal::ZERO);
        let result = find_root(square_minus(dec!(4)), |x| Ok(dec!(2) * x), &config).unwrap();
        assert_eq!(result.method, SolverMethod::Bisection);
        assert!((result.root - dec!(2)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_flat_derivative_without_bracket_errors() {
        let config = SolverConfig::annuity_rate()
            .with_seed(Decimal::ZERO)
            .with_bracket(None);
        let err = find_root(square_minus(dec!(4)), |x| Ok(dec!(2) * x), &config).unwrap_err();
        assert!(matches!(err, LoanCalcError::NonConvergence { .. }));
    }

    #[test]
    fn test_bisection_expands_upper_bound() {
        // Root at 50 lies outside [1e-12, 10]; three doublings reach 80.
        let result = bisection(|x| Ok(x - dec!(50)), &Bracket::default()).unwrap();
        assert!((result.root - dec!(50)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_bisection_no_sign_change() {
        let err = bisection(|x| Ok(x * x + Decimal::ONE), &Bracket::default()).unwrap_err();
        assert!(matches!(err, LoanCalcError::NonConvergence { .. }));
    }

    #[test]
    fn test_iteration_cap_reported() {
        // x^2 + 1 has no real root; Newton wanders until the cap.
        let config = SolverConfig::irr().with_max_iterations(25).with_seed(dec!(0.5));
        let err = newton_raphson(|x| Ok(x * x + Decimal::ONE), |x| Ok(dec!(2) * x), &config)
            .unwrap_err();
        match err {
            LoanCalcError::NonConvergence { iterations, .. } => assert!(iterations <= 25),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let json = serde_json::to_string(&SolverConfig::irr()).unwrap();
        let back: SolverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SolverConfig::irr());
    }
}
