use std::cell::Cell;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoanCalcError;
use crate::solver::{find_root_numerical, SolverConfig};
use crate::types::*;
use crate::LoanCalcResult;

/// An initial outlay followed by one cash flow per period (flow `k` lands at
/// the end of period `k`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSeries {
    pub initial_outlay: Money,
    pub flows: Vec<Money>,
}

impl CashFlowSeries {
    pub fn new(initial_outlay: Money, flows: Vec<Money>) -> Self {
        Self {
            initial_outlay,
            flows,
        }
    }

    pub fn validate(&self) -> LoanCalcResult<()> {
        require_positive("initial_outlay", self.initial_outlay)?;
        if self.flows.is_empty() {
            return Err(LoanCalcError::InvalidInputCount {
                context: "cash flow series".into(),
                expected: "at least one period cash flow".into(),
                found: 0,
            });
        }
        Ok(())
    }

    /// The series as signed flows from period 0: `[-outlay, flow_1, ...]`.
    pub fn signed_flows(&self) -> Vec<Money> {
        std::iter::once(-self.initial_outlay)
            .chain(self.flows.iter().copied())
            .collect()
    }
}

/// Sum of `cash_flows[t] / (1 + rate)^t`, with `t = 0` undiscounted.
pub fn discounted_sum(rate: Rate, cash_flows: &[Money]) -> LoanCalcResult<Money> {
    if rate <= dec!(-1) {
        return Err(LoanCalcError::domain(
            "npv",
            format!("discount rate must be greater than -100% (got {rate})"),
        ));
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| LoanCalcError::overflow(format!("npv discount factor at period {t}")))?;
        }
        let term = cf
            .checked_div(discount)
            .ok_or_else(|| LoanCalcError::overflow(format!("npv term at period {t}")))?;
        result = result
            .checked_add(term)
            .ok_or_else(|| LoanCalcError::overflow("npv sum"))?;
    }

    Ok(result)
}

/// Net present value: `-outlay + sum(flow_k / (1 + rate)^k)`.
pub fn npv(rate: Rate, series: &CashFlowSeries) -> LoanCalcResult<Money> {
    series.validate()?;
    discounted_sum(rate, &series.signed_flows())
}

/// Internal rate of return with the default IRR solver settings.
pub fn irr(series: &CashFlowSeries) -> LoanCalcResult<Rate> {
    irr_with(series, &SolverConfig::irr()).map(|(rate, _)| rate)
}

/// Internal rate of return by Newton-Raphson on the NPV with a forward-difference
/// derivative. Returns the rate and the iterations used.
pub fn irr_with(series: &CashFlowSeries, config: &SolverConfig) -> LoanCalcResult<(Rate, u32)> {
    series.validate()?;
    let flows = series.signed_flows();
    // One NPV evaluation at the estimate plus one for the forward difference.
    let evaluations = Cell::new(0u32);
    let last_npv = Cell::new(Decimal::ZERO);
    let objective = |r: Rate| -> LoanCalcResult<Money> {
        evaluations.set(evaluations.get() + 1);
        let value = discounted_sum(r, &flows)?;
        last_npv.set(value);
        Ok(value)
    };

    let result = find_root_numerical(objective, config).map_err(|e| match e {
        LoanCalcError::NonConvergence {
            iterations,
            last_delta,
            ..
        } => LoanCalcError::NonConvergence {
            function: "IRR".into(),
            iterations,
            last_delta,
        },
        // an estimate stepped to -100% or beyond, or out of Decimal range
        err @ (LoanCalcError::DomainError { .. } | LoanCalcError::NumericOverflow { .. }) => {
            debug!(error = %err, "IRR estimate left the NPV domain");
            LoanCalcError::NonConvergence {
                function: "IRR".into(),
                iterations: evaluations.get() / 2,
                last_delta: last_npv.get(),
            }
        }
        other => other,
    })?;
    Ok((result.root, result.iterations))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrOutput {
    pub irr: Rate,
    pub irr_percent: Decimal,
    pub npv_at_irr: Money,
    pub iterations: u32,
    pub undiscounted_net: Money,
}

/// IRR plus the NPV check at the rate found, in the computation envelope.
pub fn calculate_irr(
    series: &CashFlowSeries,
    config: &SolverConfig,
) -> LoanCalcResult<ComputationOutput<IrrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (rate, iterations) = irr_with(series, config)?;
    let npv_at_irr = npv(rate, series)?;
    let undiscounted_net = series.flows.iter().copied().sum::<Decimal>() - series.initial_outlay;

    let sign_changes = series
        .flows
        .windows(2)
        .filter(|w| !w[0].is_zero() && !w[1].is_zero() && w[0].is_sign_negative() != w[1].is_sign_negative())
        .count();
    if sign_changes > 0 {
        warnings.push(format!(
            "Cash flows change sign {} more time(s) after the outlay; several rates may zero the NPV",
            sign_changes
        ));
    }
    if rate < Decimal::ZERO {
        warnings.push("Negative IRR: the flows do not recover the initial outlay".into());
    }

    let output = IrrOutput {
        irr: rate,
        irr_percent: (rate * dec!(100)).round_dp(4),
        npv_at_irr,
        iterations,
        undiscounted_net,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "IRR via Newton-Raphson (forward-difference derivative)",
        &serde_json::json!({
            "initial_outlay": series.initial_outlay.to_string(),
            "periods": series.flows.len(),
            "solver": config,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvRequest {
    /// Decimal discount rate per period
    pub rate: Rate,
    #[serde(flatten)]
    pub series: CashFlowSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvOutput {
    pub npv: Money,
    /// Present value of each period flow, period 1 first
    pub discounted_flows: Vec<Money>,
}

pub fn calculate_npv(request: &NpvRequest) -> LoanCalcResult<ComputationOutput<NpvOutput>> {
    let start = Instant::now();
    let npv_value = npv(request.rate, &request.series)?;

    let one_plus_r = Decimal::ONE + request.rate;
    let mut discount = Decimal::ONE;
    let mut discounted_flows = Vec::with_capacity(request.series.flows.len());
    for (k, cf) in request.series.flows.iter().enumerate() {
        discount = discount
            .checked_mul(one_plus_r)
            .ok_or_else(|| LoanCalcError::overflow(format!("npv discount factor at period {}", k + 1)))?;
        discounted_flows.push(
            cf.checked_div(discount)
                .ok_or_else(|| LoanCalcError::overflow(format!("npv term at period {}", k + 1)))?,
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net present value",
        &serde_json::json!({
            "rate": request.rate.to_string(),
            "initial_outlay": request.series.initial_outlay.to_string(),
            "periods": request.series.flows.len(),
        }),
        Vec::new(),
        elapsed,
        NpvOutput {
            npv: npv_value,
            discounted_flows,
        },
    ))
}
