//! Nominal and effective rate conversions.
//!
//! Rates here are decimals (0.12 = 12%). A nominal rate is annual and
//! compounded `m` times a year; an effective rate is per period of its own
//! frequency, so an annual effective rate is the usual EAR.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::conversion::Frequency;
use crate::error::LoanCalcError;
use crate::math::{decimal_ln, growth_factor};
use crate::types::*;
use crate::LoanCalcResult;

/// How a quoted rate is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    #[serde(alias = "nominal_annual")]
    Nominal,
    #[serde(alias = "periodic")]
    Effective,
}

/// Convert `rate` (a `from_kind` rate on `from` frequency) into a `to_kind`
/// rate on `to` frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConversionRequest {
    pub rate: Rate,
    pub from_kind: RateKind,
    pub from: Frequency,
    pub to_kind: RateKind,
    pub to: Frequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConversion {
    pub input_rate: Rate,
    pub converted_rate: Rate,
    /// Effective annual rate both sides agree on
    pub effective_annual: Rate,
    pub from_kind: RateKind,
    pub from: Frequency,
    pub to_kind: RateKind,
    pub to: Frequency,
}

/// `(1 + j/m)^m - 1`: the effective annual rate of nominal `j` compounded `m` times.
pub fn nominal_to_effective(nominal: Rate, compounding: Frequency) -> LoanCalcResult<Rate> {
    require_non_negative("nominal rate", nominal)?;
    let m = compounding.periods_per_year();
    Ok(growth_factor(nominal / m, m, "nominal_to_effective")? - Decimal::ONE)
}

/// `m((1 + e)^(1/m) - 1)`: the nominal rate compounded `m` times that yields
/// effective annual rate `e`.
pub fn effective_to_nominal(effective: Rate, compounding: Frequency) -> LoanCalcResult<Rate> {
    require_non_negative("effective rate", effective)?;
    let m = compounding.periods_per_year();
    let per_period = growth_factor(effective, Decimal::ONE / m, "effective_to_nominal")? - Decimal::ONE;
    Ok(m * per_period)
}

/// `(1 + i)^(m_from/m_to) - 1`: re-express a per-period effective rate on
/// another frequency.
pub fn effective_to_effective(rate: Rate, from: Frequency, to: Frequency) -> LoanCalcResult<Rate> {
    require_non_negative("effective rate", rate)?;
    if from == to {
        return Ok(rate);
    }
    let exponent = from.periods_per_year() / to.periods_per_year();
    Ok(growth_factor(rate, exponent, "effective_to_effective")? - Decimal::ONE)
}

/// Change the compounding frequency of a nominal rate, keeping the effective
/// annual rate fixed.
pub fn nominal_to_nominal(rate: Rate, from: Frequency, to: Frequency) -> LoanCalcResult<Rate> {
    if from == to {
        require_non_negative("nominal rate", rate)?;
        return Ok(rate);
    }
    effective_to_nominal(nominal_to_effective(rate, from)?, to)
}

/// General conversion through the effective annual rate.
pub fn convert_rate(request: &RateConversionRequest) -> LoanCalcResult<RateConversion> {
    let effective_annual = match request.from_kind {
        RateKind::Nominal => nominal_to_effective(request.rate, request.from)?,
        RateKind::Effective => effective_to_effective(request.rate, request.from, Frequency::Annual)?,
    };

    let converted_rate = match (request.from_kind, request.to_kind) {
        (RateKind::Nominal, RateKind::Nominal) => {
            nominal_to_nominal(request.rate, request.from, request.to)?
        }
        (RateKind::Effective, RateKind::Effective) => {
            effective_to_effective(request.rate, request.from, request.to)?
        }
        (_, RateKind::Nominal) => effective_to_nominal(effective_annual, request.to)?,
        (_, RateKind::Effective) => {
            effective_to_effective(effective_annual, Frequency::Annual, request.to)?
        }
    };

    Ok(RateConversion {
        input_rate: request.rate,
        converted_rate,
        effective_annual,
        from_kind: request.from_kind,
        from: request.from,
        to_kind: request.to_kind,
        to: request.to,
    })
}

/// [`convert_rate`] wrapped in the computation envelope.
pub fn calculate_rate_conversion(
    request: &RateConversionRequest,
) -> LoanCalcResult<ComputationOutput<RateConversion>> {
    let start = Instant::now();
    let result = convert_rate(request)?;

    let mut warnings = Vec::new();
    if request.rate > Decimal::ONE {
        warnings.push(format!(
            "Rate {} is above 100%; rates are decimals (0.12 = 12%)",
            request.rate
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rate conversion via effective annual rate",
        request,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Nominal / effective / compounding-count relation
// ---------------------------------------------------------------------------

/// Two of the three fields supplied, percentages as magnitudes (12 = 12%).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateRelationRequest {
    #[serde(default)]
    pub nominal_percent: Option<Decimal>,
    #[serde(default)]
    pub effective_percent: Option<Decimal>,
    /// Compounding periods per year
    #[serde(default)]
    pub periods: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateRelationField {
    NominalPercent,
    EffectivePercent,
    Periods,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRelation {
    pub nominal_percent: Decimal,
    pub effective_percent: Decimal,
    pub periods: Decimal,
    pub solved_for: RateRelationField,
    pub formula: String,
}

/// Solve the missing one of nominal %, effective % and compounding periods.
///
/// The periods branch is `ln(1 + e) / ln(1 + j)` with both rates as decimals,
/// and needs the effective rate above the nominal one.
pub fn solve_rate_relation(request: &RateRelationRequest) -> LoanCalcResult<RateRelation> {
    let fields = [
        ("nominal_percent", request.nominal_percent),
        ("effective_percent", request.effective_percent),
        ("periods", request.periods),
    ];
    let missing = fields.iter().filter(|(_, v)| v.is_none()).count();
    if missing != 1 {
        return Err(LoanCalcError::InvalidInputCount {
            context: "rate relation".into(),
            expected: "exactly one empty field among nominal_percent, effective_percent, periods"
                .into(),
            found: missing,
        });
    }
    for (field, value) in fields {
        if let Some(v) = value {
            require_positive(field, v)?;
        }
    }

    let hundred = dec!(100);
    match (request.nominal_percent, request.effective_percent, request.periods) {
        (Some(nominal), None, Some(m)) => {
            let growth = growth_factor(nominal / hundred / m, m, "rate relation")?;
            Ok(RateRelation {
                nominal_percent: nominal,
                effective_percent: (growth - Decimal::ONE) * hundred,
                periods: m,
                solved_for: RateRelationField::EffectivePercent,
                formula: format!("(1 + {nominal}%/{m})^{m} - 1"),
            })
        }
        (None, Some(effective), Some(m)) => {
            let root = growth_factor(effective / hundred, Decimal::ONE / m, "rate relation")?;
            Ok(RateRelation {
                nominal_percent: m * (root - Decimal::ONE) * hundred,
                effective_percent: effective,
                periods: m,
                solved_for: RateRelationField::NominalPercent,
                formula: format!("{m} * ((1 + {effective}%)^(1/{m}) - 1)"),
            })
        }
        (Some(nominal), Some(effective), None) => {
            if effective <= nominal {
                return Err(LoanCalcError::domain(
                    "rate relation",
                    "effective rate must exceed the nominal rate to solve for periods",
                ));
            }
            let numerator = decimal_ln(Decimal::ONE + effective / hundred)
                .ok_or_else(|| LoanCalcError::overflow("rate relation periods"))?;
            let denominator = decimal_ln(Decimal::ONE + nominal / hundred)
                .ok_or_else(|| LoanCalcError::overflow("rate relation periods"))?;
            Ok(RateRelation {
                nominal_percent: nominal,
                effective_percent: effective,
                periods: numerator / denominator,
                solved_for: RateRelationField::Periods,
                formula: format!("ln(1 + {effective}%) / ln(1 + {nominal}%)"),
            })
        }
        _ => Err(LoanCalcError::InvalidInputCount {
            context: "rate relation".into(),
            expected: "exactly one empty field".into(),
            found: missing,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Decimal = dec!(0.000000001);

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < TOL
    }

    #[test]
    fn test_nominal_monthly_to_effective() {
        let ear = nominal_to_effective(dec!(0.12), Frequency::Monthly).unwrap();
        assert!(close(ear, dec!(0.126825030131969720661201)), "got {ear}");
    }

    #[test]
    fn test_effective_to_nominal_round_trip() {
        for freq in Frequency::ALL {
            let ear = nominal_to_effective(dec!(0.18), freq).unwrap();
            let back = effective_to_nominal(ear, freq).unwrap();
            assert!(close(back, dec!(0.18)), "{freq}: got {back}");
        }
    }

    #[test]
    fn test_effective_annual_to_quarterly() {
        let q = effective_to_effective(dec!(0.12), Frequency::Annual, Frequency::Quarterly).unwrap();
        assert!(close(q, dec!(0.0287373447220802)), "got {q}");
    }

    #[test]
    fn test_nominal_monthly_to_nominal_quarterly() {
        // 1% a month compounds to 1.01^3 - 1 per quarter
        let j = nominal_to_nominal(dec!(0.12), Frequency::Monthly, Frequency::Quarterly).unwrap();
        assert!(close(j, dec!(0.121204)), "got {j}");
    }

    #[test]
    fn test_daily_uses_365() {
        let j = effective_to_nominal(dec!(0.12), Frequency::Daily).unwrap();
        assert!((j - dec!(0.1133462808142)).abs() < dec!(0.0000000001), "got {j}");
    }

    #[test]
    fn test_zero_rate_converts_to_zero() {
        assert_eq!(
            nominal_to_nominal(Decimal::ZERO, Frequency::Monthly, Frequency::Annual).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(nominal_to_effective(dec!(-0.05), Frequency::Monthly).is_err());
    }

    #[test]
    fn test_convert_rate_mixed_kinds() {
        let out = convert_rate(&RateConversionRequest {
            rate: dec!(0.01),
            from_kind: RateKind::Effective,
            from: Frequency::Monthly,
            to_kind: RateKind::Nominal,
            to: Frequency::Monthly,
        })
        .unwrap();
        assert!(close(out.converted_rate, dec!(0.12)), "got {}", out.converted_rate);
        assert!(close(out.effective_annual, dec!(0.126825030131969720661201)));
    }

    #[test]
    fn test_relation_effective_from_nominal() {
        let r = solve_rate_relation(&RateRelationRequest {
            nominal_percent: Some(dec!(12)),
            periods: Some(dec!(12)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(r.solved_for, RateRelationField::EffectivePercent);
        assert!(close(r.effective_percent, dec!(12.6825030131969720661201)));
    }

    #[test]
    fn test_relation_nominal_from_effective() {
        let r = solve_rate_relation(&RateRelationRequest {
            effective_percent: Some(dec!(12.6825030131969720661201)),
            periods: Some(dec!(12)),
            ..Default::default()
        })
        .unwrap();
        assert!(close(r.nominal_percent, dec!(12)), "got {}", r.nominal_percent);
    }

    #[test]
    fn test_relation_periods() {
        let r = solve_rate_relation(&RateRelationRequest {
            nominal_percent: Some(dec!(12)),
            effective_percent: Some(dec!(12.68250301319697)),
            periods: None,
        })
        .unwrap();
        assert!((r.periods - dec!(1.05360765383059)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_relation_periods_needs_effective_above_nominal() {
        let err = solve_rate_relation(&RateRelationRequest {
            nominal_percent: Some(dec!(12)),
            effective_percent: Some(dec!(10)),
            periods: None,
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::DomainError { .. }));
    }

    #[test]
    fn test_relation_field_count() {
        let err = solve_rate_relation(&RateRelationRequest {
            nominal_percent: Some(dec!(12)),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, LoanCalcError::InvalidInputCount { found: 2, .. }));
    }
}
