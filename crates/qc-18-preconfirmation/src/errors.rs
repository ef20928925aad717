//! # Error Types
//!
//! Everything that ends a submission without a Confirmed or Failed verdict.

use qc_06_mempool::AdmissionError;
use qc_11_state_transition::errors::{InvariantViolation, StateError, ValidationError};
use shared_types::entities::{hash_hex, Hash};
use thiserror::Error;

/// Preconfirmation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconfError {
    /// Rejected at validation; the transaction was not evaluated.
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// We could not evaluate the transaction.
    #[error("preconf evaluation unavailable: {0}")]
    Infrastructure(#[from] StateError),

    /// Broken invariant upstream. Indicates a bug, never a user condition.
    #[error("internal error: {0}")]
    Internal(String),

    /// No verdict within the configured wait.
    #[error("preconf timed out for {}", hash_hex(.tx_hash))]
    Timeout { tx_hash: Hash },

    /// The pool has not finished start-up.
    #[error("pool not ready for preconf traffic")]
    NotReady,

    /// Normal admission refused the transaction.
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

impl From<InvariantViolation> for PreconfError {
    fn from(violation: InvariantViolation) -> Self {
        Self::Internal(violation.to_string())
    }
}

impl PreconfError {
    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "validation",
            Self::Infrastructure(_) => "infrastructure",
            Self::Internal(_) => "internal",
            Self::Timeout { .. } => "timeout",
            Self::NotReady => "not_ready",
            Self::Admission(_) => "admission",
        }
    }
}
