use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use loan_calc_core::solver::SolverConfig;
use loan_calc_core::{amortization, annuity, gradient, interest, rates, time_value, LoanCalcResult};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Solver settings from an optional JSON override, else `preset`.
fn solver_config(solver_json: Option<String>, preset: SolverConfig) -> NapiResult<SolverConfig> {
    match solver_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error),
        None => Ok(preset),
    }
}

/// Parse `input_json` as `I`, run `calc` and serialise its output.
fn call<I, O>(input_json: &str, calc: impl FnOnce(&I) -> LoanCalcResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    call(&input_json, amortization::build_schedule)
}

// ---------------------------------------------------------------------------
// Annuities
// ---------------------------------------------------------------------------

#[napi]
pub fn solve_annuity(input_json: String, solver_json: Option<String>) -> NapiResult<String> {
    let config = solver_config(solver_json, SolverConfig::annuity_rate())?;
    call(&input_json, |req: &annuity::AnnuitySolveRequest| annuity::calculate_annuity(req, &config))
}

#[derive(Deserialize)]
struct AnnuityFvInput {
    payment: Decimal,
    rate_percent: Decimal,
    periods: u32,
}

#[napi]
pub fn annuity_future_value(input_json: String) -> NapiResult<String> {
    call(&input_json, |req: &AnnuityFvInput| {
        annuity::annuity_future_value(req.payment, req.rate_percent, req.periods)
    })
}

#[napi]
pub fn gradient_series(input_json: String) -> NapiResult<String> {
    call(&input_json, gradient::calculate_gradient_series)
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

#[napi]
pub fn convert_rate(input_json: String) -> NapiResult<String> {
    call(&input_json, rates::calculate_rate_conversion)
}

#[napi]
pub fn solve_rate_relation(input_json: String) -> NapiResult<String> {
    call(&input_json, rates::solve_rate_relation)
}

// ---------------------------------------------------------------------------
// Cash flows
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_irr(input_json: String, solver_json: Option<String>) -> NapiResult<String> {
    let config = solver_config(solver_json, SolverConfig::irr())?;
    call(&input_json, |series: &time_value::CashFlowSeries| time_value::calculate_irr(series, &config))
}

#[napi]
pub fn calculate_npv(input_json: String) -> NapiResult<String> {
    call(&input_json, time_value::calculate_npv)
}

// ---------------------------------------------------------------------------
// Interest
// ---------------------------------------------------------------------------

#[napi]
pub fn simple_interest(input_json: String) -> NapiResult<String> {
    call(&input_json, interest::calculate_simple_interest)
}

#[napi]
pub fn compound_interest(input_json: String) -> NapiResult<String> {
    call(&input_json, interest::calculate_compound_interest)
}

#[napi]
pub fn capitalize(input_json: String) -> NapiResult<String> {
    call(&input_json, interest::calculate_capitalization)
}
