//! Decimal math helpers (no f64, no powd).
//!
//! Arguments are reduced by powers of two before the series run, and the series
//! are summed to ~1e-27. Overflow comes back as `None`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

use crate::error::LoanCalcError;
use crate::LoanCalcResult;

/// ln(2) to the full 28 digits a Decimal can carry.
const LN_2: Decimal = dec!(0.6931471805599453094172321215);

/// Series terms below this no longer move a 28-digit Decimal.
const SERIES_EPSILON: Decimal = dec!(0.000000000000000000000000001);

const MAX_SERIES_TERMS: u32 = 120;

/// Largest power of two that still fits (2^95 < Decimal::MAX < 2^96).
const MAX_BINARY_EXPONENT: i64 = 95;

/// e^x. `None` when the result does not fit in a Decimal.
pub fn decimal_exp(x: Decimal) -> Option<Decimal> {
    if x.is_zero() {
        return Some(Decimal::ONE);
    }

    // e^x = 2^k * e^r with |r| <= ln(2)/2
    let k = x.checked_div(LN_2)?.round();
    let k_int = k.to_i64()?;
    if k_int > MAX_BINARY_EXPONENT + 1 {
        return None;
    }
    if k_int < -(MAX_BINARY_EXPONENT + 1) {
        return Some(Decimal::ZERO);
    }
    let r = x - k * LN_2;

    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1..=MAX_SERIES_TERMS {
        term = term * r / Decimal::from(n);
        sum += term;
        if term.abs() < SERIES_EPSILON {
            break;
        }
    }

    scale_by_power_of_two(sum, k_int)
}

/// Natural logarithm. `None` for non-positive input.
pub fn decimal_ln(x: Decimal) -> Option<Decimal> {
    if x <= Decimal::ZERO {
        return None;
    }
    if x == Decimal::ONE {
        return Some(Decimal::ZERO);
    }

    // x = m * 2^k with m in [0.75, 1.5)
    let mut m = x;
    let mut k: i64 = 0;
    while m >= dec!(1.5) {
        m /= dec!(2);
        k += 1;
    }
    while m < dec!(0.75) {
        m *= dec!(2);
        k -= 1;
    }

    // ln(m) = 2 * atanh(z), z = (m - 1) / (m + 1), |z| <= 0.2
    let z = (m - Decimal::ONE) / (m + Decimal::ONE);
    let z2 = z * z;
    let mut power = z;
    let mut sum = z;
    let mut denom = Decimal::ONE;
    for _ in 0..MAX_SERIES_TERMS {
        power *= z2;
        denom += dec!(2);
        let term = power / denom;
        sum += term;
        if term.abs() < SERIES_EPSILON {
            break;
        }
    }

    Some(dec!(2) * sum + Decimal::from(k) * LN_2)
}

/// base^exp for an arbitrary Decimal exponent.
///
/// Integer exponents go through exact repeated squaring; everything else through
/// exp(exp * ln(base)), which needs a positive base.
pub fn power_decimal(base: Decimal, exp: Decimal) -> Option<Decimal> {
    if exp.is_zero() {
        return Some(Decimal::ONE);
    }
    if base == Decimal::ONE {
        return Some(Decimal::ONE);
    }
    if exp.fract().is_zero() {
        let n = exp.to_i64()?;
        return base.checked_powi(n);
    }
    if base.is_zero() {
        return if exp > Decimal::ZERO {
            Some(Decimal::ZERO)
        } else {
            None
        };
    }
    if base < Decimal::ZERO {
        return None;
    }
    let log = decimal_ln(base)?;
    decimal_exp(log.checked_mul(exp)?)
}

/// (1 + rate)^periods, the accumulation factor every formula in the crate shares.
pub fn growth_factor(rate: Decimal, periods: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    let base = Decimal::ONE + rate;
    if base <= Decimal::ZERO {
        return Err(LoanCalcError::domain(
            context,
            format!("1 + rate must be positive (rate = {rate})"),
        ));
    }
    power_decimal(base, periods).ok_or_else(|| {
        LoanCalcError::overflow(format!("{context}: (1 + {rate})^{periods}"))
    })
}

/// Round half away from zero, the way a form rounds a period count.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn scale_by_power_of_two(value: Decimal, k: i64) -> Option<Decimal> {
    if k == 0 {
        return Some(value);
    }
    let mut result = value;
    let step = if k > 0 { dec!(2) } else { dec!(0.5) };
    for _ in 0..k.unsigned_abs() {
        result = result.checked_mul(step)?;
    }
    Some(result)
}
