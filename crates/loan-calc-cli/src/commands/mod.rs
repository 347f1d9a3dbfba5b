pub mod annuity;
pub mod interest;
pub mod periods;
pub mod rates;
pub mod schedule;
pub mod time_value;

use clap::Args;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use loan_calc_core::TimeSpec;

/// Parse a flag into any enum the core deserialises, Spanish aliases included.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(s.trim().to_lowercase()))
        .map_err(|_| format!("unrecognised value '{}'", s))
}

/// Term flags shared by every command that takes a duration.
#[derive(Args, Debug, Clone, Default)]
pub struct TimeArgs {
    /// Whole or fractional years
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Months on top of the years
    #[arg(long)]
    pub months: Option<Decimal>,

    /// Days on top of the years and months (365-day year)
    #[arg(long)]
    pub days: Option<Decimal>,
}

impl TimeArgs {
    pub fn to_spec(&self) -> TimeSpec {
        TimeSpec::new(
            self.years.unwrap_or_default(),
            self.months.unwrap_or_default(),
            self.days.unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_calc_core::annuity::AnnuityTiming;
    use loan_calc_core::rates::RateKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_enum_accepts_aliases() {
        assert_eq!(parse_enum::<AnnuityTiming>("Anticipada"), Ok(AnnuityTiming::Due));
        assert_eq!(parse_enum::<RateKind>("effective"), Ok(RateKind::Effective));
        assert!(parse_enum::<RateKind>("sideways").is_err());
    }

    #[test]
    fn test_missing_time_components_are_zero() {
        let args = TimeArgs {
            months: Some(dec!(18)),
            ..Default::default()
        };
        let spec = args.to_spec();
        assert_eq!(spec.years, Decimal::ZERO);
        assert_eq!(spec.months, dec!(18));
    }
}
