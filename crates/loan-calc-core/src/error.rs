use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanCalcError {
    #[error("Invalid input count in {context}: expected {expected}, found {found}")]
    InvalidInputCount {
        context: String,
        expected: String,
        found: usize,
    },

    #[error("Non-positive value: {field} — {reason}")]
    NonPositiveValue { field: String, reason: String },

    #[error("Domain error in {context}: {reason}")]
    DomainError { context: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    NonConvergence {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanCalcError {
    pub(crate) fn non_positive(field: &str, reason: &str) -> Self {
        LoanCalcError::NonPositiveValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn domain(context: &str, reason: impl Into<String>) -> Self {
        LoanCalcError::DomainError {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        LoanCalcError::NumericOverflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for LoanCalcError {
    fn from(e: serde_json::Error) -> Self {
        LoanCalcError::SerializationError(e.to_string())
    }
}
