use loan_calc_core::gradient::{calculate_gradient_series, gradient_present_value, GradientSeriesInput};
use loan_calc_core::solver::SolverConfig;
use loan_calc_core::time_value::{calculate_irr, calculate_npv, irr, irr_with, npv, CashFlowSeries, NpvRequest};
use loan_calc_core::LoanCalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn project() -> CashFlowSeries {
    CashFlowSeries::new(dec!(10000), vec![dec!(3000), dec!(4000), dec!(5000), dec!(2000)])
}

// ===========================================================================
// IRR
// ===========================================================================

#[test]
fn test_irr_of_four_year_project() {
    let out = calculate_irr(&project(), &SolverConfig::irr()).unwrap();
    let r = &out.result;
    assert!((r.irr - dec!(0.1532213788)).abs() < dec!(0.000001), "got {}", r.irr);
    assert_eq!(r.irr_percent.round_dp(2), dec!(15.32));
    assert!(r.npv_at_irr.abs() < dec!(0.000001), "npv {}", r.npv_at_irr);
    assert_eq!(r.undiscounted_net, dec!(4000));
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
}

#[test]
fn test_irr_independent_of_seed() {
    let from_default = irr(&project()).unwrap();
    let (from_high, _) = irr_with(&project(), &SolverConfig::irr().with_seed(dec!(0.40))).unwrap();
    assert!((from_default - from_high).abs() < dec!(0.000001));
}

#[test]
fn test_irr_negative_when_outlay_not_recovered() {
    let series = CashFlowSeries::new(dec!(1000), vec![dec!(300), dec!(300), dec!(300)]);
    let out = calculate_irr(&series, &SolverConfig::irr()).unwrap();
    assert!(out.result.irr < Decimal::ZERO);
    assert!(out.warnings.iter().any(|w| w.contains("Negative IRR")));
}

#[test]
fn test_irr_iteration_cap_reported() {
    let config = SolverConfig::irr().with_max_iterations(1);
    let err = irr_with(&project(), &config).unwrap_err();
    match err {
        LoanCalcError::NonConvergence {
            function,
            iterations,
            ..
        } => {
            assert_eq!(function, "IRR");
            assert_eq!(iterations, 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_irr_warns_on_sign_changes() {
    let series = CashFlowSeries::new(dec!(1000), vec![dec!(800), dec!(-200), dec!(700)]);
    let out = calculate_irr(&series, &SolverConfig::irr()).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("change sign")));
}

// ===========================================================================
// NPV
// ===========================================================================

#[test]
fn test_npv_at_irr_is_zero() {
    let r = irr(&project()).unwrap();
    assert!(npv(r, &project()).unwrap().abs() < dec!(0.000001));
}

#[test]
fn test_npv_positive_below_irr_negative_above() {
    assert!(npv(dec!(0.10), &project()).unwrap() > Decimal::ZERO);
    assert!(npv(dec!(0.20), &project()).unwrap() < Decimal::ZERO);
}

#[test]
fn test_npv_request_from_json() {
    let req: NpvRequest = serde_json::from_str(
        r#"{"rate": "0.1", "initial_outlay": "100", "flows": ["110", "121"]}"#,
    )
    .unwrap();
    let out = calculate_npv(&req).unwrap();
    assert_eq!(out.result.npv, dec!(100));
    assert_eq!(out.result.discounted_flows.len(), 2);
}

// ===========================================================================
// Gradient series
// ===========================================================================

#[test]
fn test_gradient_matches_explicit_discounting() {
    let input = GradientSeriesInput {
        first_payment: dec!(500),
        gradient: dec!(50),
        rate: dec!(0.08),
        periods: 6,
    };
    let out = gradient_present_value(&input).unwrap();

    let flows: Vec<Decimal> = (0..6).map(|k| dec!(500) + dec!(50) * Decimal::from(k)).collect();
    let explicit = npv(dec!(0.08), &CashFlowSeries::new(dec!(1), flows)).unwrap() + Decimal::ONE;
    assert!((out.present_value - explicit).abs() < dec!(0.000001), "{} vs {explicit}", out.present_value);
    assert_eq!(out.last_payment, dec!(750));
}

#[test]
fn test_gradient_equivalent_annuity_is_level_payment() {
    let out = gradient_present_value(&GradientSeriesInput {
        first_payment: dec!(1000),
        gradient: Decimal::ZERO,
        rate: dec!(5),
        periods: 10,
    })
    .unwrap();
    assert!((out.equivalent_annuity - dec!(1000)).abs() < dec!(0.000001));
    assert_eq!(out.gradient_component, Decimal::ZERO);
}

#[test]
fn test_gradient_negative_slope_warned() {
    let out = calculate_gradient_series(&GradientSeriesInput {
        first_payment: dec!(100),
        gradient: dec!(-30),
        rate: dec!(0.05),
        periods: 5,
    })
    .unwrap();
    assert_eq!(out.result.last_payment, dec!(-20));
    assert!(out.warnings.iter().any(|w| w.contains("below zero")));
}
