//! Period-by-period schedule generators.
//!
//! All five share the same preamble: the term is rounded half-up to a whole
//! number of payment periods and the quoted rate is converted pro-rata with
//! [`rate_per_period_nominal`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{AmortizationMethod, ScheduleResult, ScheduleRow};
use crate::conversion::{periods_from_time, rate_per_period_nominal, Frequency};
use crate::error::LoanCalcError;
use crate::math::{growth_factor, round_half_up};
use crate::types::*;
use crate::LoanCalcResult;

/// Whole period count and per-period rate for one schedule.
struct Terms {
    n: u32,
    periods: Decimal,
    rate: Rate,
}

fn prepare(
    principal: Money,
    rate: &RateSpec,
    time: &TimeSpec,
    frequency: Frequency,
) -> LoanCalcResult<Terms> {
    require_positive("principal", principal)?;
    let periods = round_half_up(periods_from_time(time, frequency)?);
    if periods < Decimal::ONE {
        return Err(LoanCalcError::non_positive(
            "periods",
            "Loan term must cover at least one payment period",
        ));
    }
    let n = periods
        .to_u32()
        .ok_or_else(|| LoanCalcError::overflow("schedule period count"))?;
    let rate = rate_per_period_nominal(rate, frequency)?;
    Ok(Terms { n, periods, rate })
}

fn mul(a: Decimal, b: Decimal, context: &str) -> LoanCalcResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| LoanCalcError::overflow(context))
}

/// Flat interest on the original principal, spread with the principal over
/// equal instalments. The principal column is `payment - P*i`.
pub fn simple_schedule(
    principal: Money,
    rate: &RateSpec,
    time: &TimeSpec,
    frequency: Frequency,
) -> LoanCalcResult<ScheduleResult> {
    let t = prepare(principal, rate, time, frequency)?;

    let interest = mul(principal, t.rate, "simple schedule interest")?;
    let total_interest = mul(interest, t.periods, "simple schedule total interest")?;
    let payment = (principal + total_interest) / t.periods;
    let principal_part = payment - interest;

    let mut rows = Vec::with_capacity(t.n as usize);
    let mut balance = principal;
    for period in 1..=t.n {
        balance = (balance - principal_part).max(Decimal::ZERO);
        rows.push(ScheduleRow {
            period,
            payment,
            interest,
            principal: principal_part,
            balance,
        });
    }

    Ok(ScheduleResult {
        method: AmortizationMethod::Simple,
        rows,
        total_payment: payment * t.periods,
        total_interest,
        periodic_payment: payment,
        periods: t.n,
        rate_per_period: t.rate,
    })
}

/// Constant instalment `A = P*i / (1 - (1+i)^-n)`, or `P/n` at a zero rate.
pub fn french_schedule(
    principal: Money,
    rate: &RateSpec,
    time: &TimeSpec,
    frequency: Frequency,
) -> LoanCalcResult<ScheduleResult> {
    let t = prepare(principal, rate, time, frequency)?;

    let payment = if t.rate.is_zero() {
        principal / t.periods
    } else {
        let discount = growth_factor(t.rate, -t.periods, "french schedule")?;
        mul(principal, t.rate, "french schedule payment")? / (Decimal::ONE - discount)
    };

    let mut rows = Vec::with_capacity(t.n as usize);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    for period in 1..=t.n {
        let interest = balance * t.rate;
        // The last instalment retires the remaining balance exactly.
        let (row_payment, principal_part) = if period == t.n {
            (balance + interest, balance)
        } else {
            (payment, payment - interest)
        };
        balance = (balance - principal_part).max(Decimal::ZERO);
        total_interest += interest;
        rows.push(ScheduleRow {
            period,
            payment: row_payment,
            interest,
            principal: principal_part,
            balance,
        });
    }

    Ok(ScheduleResult {
        method: AmortizationMethod::French,
        rows,
        total_payment: mul(payment, t.periods, "french schedule total")?,
        total_interest,
        periodic_payment: payment,
        periods: t.n,
        rate_per_period: t.rate,
    })
}

/// Constant principal `P/n`; interest on the opening balance, so payments fall.
pub fn german_schedule(
    principal: Money,
    rate: &RateSpec,
    time: &TimeSpec,
    frequency: Frequency,
) -> LoanCalcResult<ScheduleResult> {
    let t = prepare(principal, rate, time, frequency)?;
    // Bounds every balance * rate product below.
    mul(principal, t.rate, "german schedule interest")?;

    let principal_part = principal / t.periods;
    let mut rows = Vec::with_capacity(t.n as usize);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    for period in 1..=t.n {
        let interest = balance * t.rate;
        let payment = principal_part + interest;
        balance = (balance - principal_part).max(Decimal::ZERO);
        total_interest += interest;
        rows.push(ScheduleRow {
            period,
            payment,
            interest,
            principal: principal_part,
            balance,
        });
    }

    let periodic_payment = rows.first().map(|r| r.payment).unwrap_or_default();
    Ok(ScheduleResult {
        method: AmortizationMethod::German,
        rows,
        total_payment: principal + total_interest,
        total_interest,
        periodic_payment,
        periods: t.n,
        rate_per_period: t.rate,
    })
}

/// Bullet loan: interest only, full principal in the last period.
pub fn american_schedule(
    principal: Money,
    rate: &RateSpec,
    time: &TimeSpec,
    frequency: Frequency,
) -> LoanCalcResult<ScheduleResult> {
    let t = prepare(principal, rate, time, frequency)?;

    let interest = mul(principal, t.rate, "american schedule interest")?;
    let mut rows = Vec::with_capacity(t.n as usize);
    for period in 1..=t.n {
        let last = period == t.n;
        let principal_part = if last { principal } else { Decimal::ZERO };
        rows.push(ScheduleRow {
            period,
            payment: interest + principal_part,
            interest,
            principal: principal_part,
            balance: if last { Decimal::ZERO } else { principal },
        });
    }

    let total_interest = mul(interest, t.periods, "american schedule total interest")?;
    let periodic_payment = rows.first().map(|r| r.payment).unwrap_or_default();
    Ok(ScheduleResult {
        method: AmortizationMethod::American,
        rows,
        total_payment: principal + total_interest,
        total_interest,
        periodic_payment,
        periods: t.n,
        rate_per_period: t.rate,
    })
}

/// Compounded future value `F = P(1+i)^n` paid back as `F/n` per period.
///
/// Interest is still charged on the running balance, so the principal column
/// grows over time and the balance reaches zero at or before the last period.
/// Totals come from `F`, not from the rows.
pub fn compound_schedule(
    principal: Money,
    rate: &RateSpec,
    time: &TimeSpec,
    frequency: Frequency,
) -> LoanCalcResult<ScheduleResult> {
    let t = prepare(principal, rate, time, frequency)?;

    let future_value = mul(
        principal,
        growth_factor(t.rate, t.periods, "compound schedule")?,
        "compound schedule future value",
    )?;
    let payment = future_value / t.periods;

    let mut rows = Vec::with_capacity(t.n as usize);
    let mut balance = principal;
    for period in 1..=t.n {
        let interest = balance * t.rate;
        let principal_part = payment - interest;
        balance = (balance - principal_part).max(Decimal::ZERO);
        rows.push(ScheduleRow {
            period,
            payment,
            interest,
            principal: principal_part,
            balance,
        });
    }

    Ok(ScheduleResult {
        method: AmortizationMethod::Compound,
        rows,
        total_payment: future_value,
        total_interest: future_value - principal,
        periodic_payment: payment,
        periods: t.n,
        rate_per_period: t.rate,
    })
}
