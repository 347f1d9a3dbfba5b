pub mod conversion;
pub mod error;
pub mod math;
pub mod solver;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "annuity")]
pub mod annuity;

#[cfg(feature = "rates")]
pub mod rates;

#[cfg(feature = "irr")]
pub mod time_value;

#[cfg(feature = "gradient")]
pub mod gradient;

#[cfg(feature = "interest")]
pub mod interest;

pub use conversion::{Frequency, DAYS_PER_YEAR};
pub use error::LoanCalcError;
pub use types::*;

/// Standard result type for all loan-calc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
