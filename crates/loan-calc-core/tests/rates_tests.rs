use loan_calc_core::interest::{
    calculate_capitalization, calculate_compound_interest, solve_compound_interest, solve_simple_interest,
    CapitalizationInput, CapitalizationMethod, CompoundInterestRequest, InterestUnknown, SimpleInterestRequest,
};
use loan_calc_core::rates::{
    calculate_rate_conversion, convert_rate, effective_to_effective, nominal_to_effective, nominal_to_nominal,
    solve_rate_relation, RateConversionRequest, RateKind, RateRelationRequest,
};
use loan_calc_core::{Frequency, LoanCalcError, TimeSpec};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TOL: Decimal = dec!(0.000000001);

// ===========================================================================
// Rate conversion round trips
// ===========================================================================

#[test]
fn test_every_frequency_pair_round_trips() {
    for kind in [RateKind::Nominal, RateKind::Effective] {
        for from in Frequency::ALL {
            for to in Frequency::ALL {
                let forward = convert_rate(&RateConversionRequest {
                    rate: dec!(0.09),
                    from_kind: kind,
                    from,
                    to_kind: kind,
                    to,
                })
                .unwrap();
                let back = convert_rate(&RateConversionRequest {
                    rate: forward.converted_rate,
                    from_kind: kind,
                    from: to,
                    to_kind: kind,
                    to: from,
                })
                .unwrap();
                assert!(
                    (back.converted_rate - dec!(0.09)).abs() < TOL,
                    "{kind:?} {from} -> {to}: {}",
                    back.converted_rate
                );
            }
        }
    }
}

#[test]
fn test_effective_annual_agrees_across_kinds() {
    let nominal = convert_rate(&RateConversionRequest {
        rate: dec!(0.12),
        from_kind: RateKind::Nominal,
        from: Frequency::Quarterly,
        to_kind: RateKind::Effective,
        to: Frequency::Quarterly,
    })
    .unwrap();
    // 12% nominal quarterly is 3% a quarter
    assert!((nominal.converted_rate - dec!(0.03)).abs() < TOL);
    assert!((nominal.effective_annual - dec!(0.12550881)).abs() < TOL);

    let ear = nominal_to_effective(dec!(0.12), Frequency::Quarterly).unwrap();
    assert!((ear - nominal.effective_annual).abs() < TOL);
}

#[test]
fn test_semiannual_effective_to_annual() {
    let annual = effective_to_effective(dec!(0.05), Frequency::Semiannual, Frequency::Annual).unwrap();
    assert!((annual - dec!(0.1025)).abs() < TOL, "got {annual}");
}

#[test]
fn test_same_frequency_is_identity() {
    assert_eq!(
        nominal_to_nominal(dec!(0.085), Frequency::Bimonthly, Frequency::Bimonthly).unwrap(),
        dec!(0.085)
    );
}

#[test]
fn test_percent_looking_rate_warned() {
    let out = calculate_rate_conversion(&RateConversionRequest {
        rate: dec!(12),
        from_kind: RateKind::Nominal,
        from: Frequency::Monthly,
        to_kind: RateKind::Effective,
        to: Frequency::Annual,
    })
    .unwrap();
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_conversion_request_accepts_spanish_frequencies() {
    let req: RateConversionRequest = serde_json::from_str(
        r#"{"rate": "0.12", "from_kind": "nominal", "from": "mensual", "to_kind": "effective", "to": "anual"}"#,
    )
    .unwrap();
    assert_eq!(req.from, Frequency::Monthly);
    assert_eq!(req.to, Frequency::Annual);
}

// ===========================================================================
// Rate relation
// ===========================================================================

#[test]
fn test_relation_round_trip_quarterly() {
    let effective = solve_rate_relation(&RateRelationRequest {
        nominal_percent: Some(dec!(8)),
        periods: Some(dec!(4)),
        ..Default::default()
    })
    .unwrap();
    assert!((effective.effective_percent - dec!(8.243216)).abs() < TOL);

    let nominal = solve_rate_relation(&RateRelationRequest {
        effective_percent: Some(effective.effective_percent),
        periods: Some(dec!(4)),
        ..Default::default()
    })
    .unwrap();
    assert!((nominal.nominal_percent - dec!(8)).abs() < TOL, "got {}", nominal.nominal_percent);
}

#[test]
fn test_relation_rejects_zero_periods() {
    let err = solve_rate_relation(&RateRelationRequest {
        nominal_percent: Some(dec!(8)),
        periods: Some(Decimal::ZERO),
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, LoanCalcError::NonPositiveValue { .. }));
}

// ===========================================================================
// Simple and compound interest
// ===========================================================================

#[test]
fn test_simple_interest_mixed_time_components() {
    // 1 year, 6 months and 0 days at 10% annual
    let sol = solve_simple_interest(&SimpleInterestRequest {
        capital: Some(dec!(2000)),
        rate: Some(dec!(10)),
        time: TimeSpec::new(dec!(1), dec!(6), Decimal::ZERO),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(sol.amount, dec!(2300));
    assert_eq!(sol.years, dec!(1.5));
}

#[test]
fn test_simple_interest_rate_requires_growth() {
    let err = solve_simple_interest(&SimpleInterestRequest {
        capital: Some(dec!(2000)),
        amount: Some(dec!(2000)),
        time: TimeSpec::from_years(dec!(1)),
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, LoanCalcError::DomainError { .. }));
}

#[test]
fn test_compound_capital_discounts_amount() {
    let sol = solve_compound_interest(&CompoundInterestRequest {
        amount: Some(dec!(1102.5)),
        rate: Some(dec!(10)),
        time: TimeSpec::from_years(dec!(1)),
        compounding: Frequency::Semiannual,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(sol.solved_for, InterestUnknown::Capital);
    assert!((sol.capital - dec!(1000)).abs() < TOL, "got {}", sol.capital);
    assert_eq!(sol.periods, Some(dec!(2)));
}

#[test]
fn test_compound_time_reported_in_periods_and_years() {
    // 1000 doubles at 1% a month in ~69.66 months
    let sol = solve_compound_interest(&CompoundInterestRequest {
        capital: Some(dec!(1000)),
        amount: Some(dec!(2000)),
        rate: Some(dec!(1)),
        rate_unit: Frequency::Monthly,
        compounding: Frequency::Monthly,
        ..Default::default()
    })
    .unwrap();
    let n = sol.periods.unwrap();
    assert!((n - dec!(69.660716893574)).abs() < dec!(0.000001), "got {n}");
    assert!((sol.years * dec!(12) - n).abs() < TOL);
}

#[test]
fn test_compound_unit_mismatch_warned() {
    let out = calculate_compound_interest(&CompoundInterestRequest {
        capital: Some(dec!(1000)),
        rate: Some(dec!(1)),
        rate_unit: Frequency::Monthly,
        time: TimeSpec::from_years(dec!(1)),
        compounding: Frequency::Quarterly,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(out.warnings.len(), 1);
    // 3% a quarter for 4 quarters
    assert!((out.result.amount - dec!(1125.50881)).abs() < TOL);
}

#[test]
fn test_capitalization_envelope() {
    let out = calculate_capitalization(&CapitalizationInput {
        capital: dec!(5000),
        rate: dec!(4),
        unit: Frequency::Annual,
        periods: dec!(2),
        method: CapitalizationMethod::Compound,
    })
    .unwrap();
    assert_eq!(out.result.amount, dec!(5408));
    assert_eq!(out.methodology, "Compound capitalization: M = P(1 + i)^n");
}
