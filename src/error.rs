//! Error types for deal valuation
//!
//! The engine itself never fails for finite input. These errors come from the
//! checked entry points, the loaders, and canonical hashing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("invalid deal terms: {field}: {reason}")]
    InvalidTerms { field: &'static str, reason: String },

    #[error("invalid scenario assumptions: {field}: {reason}")]
    InvalidAssumptions { field: &'static str, reason: String },

    #[error("non-finite result in {field}: {value}")]
    NonFiniteResult { field: &'static str, value: f64 },

    #[error("canonical hash requires a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ValuationResult<T> = Result<T, ValuationError>;

impl ValuationError {
    pub(crate) fn terms(field: &'static str, reason: impl Into<String>) -> Self {
        ValuationError::InvalidTerms { field, reason: reason.into() }
    }

    pub(crate) fn assumptions(field: &'static str, reason: impl Into<String>) -> Self {
        ValuationError::InvalidAssumptions { field, reason: reason.into() }
    }
}
