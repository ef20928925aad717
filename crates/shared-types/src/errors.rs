//! # Error Types
//!
//! Errors raised while building chain parameters, checking payloads or
//! decoding preconf outcomes.

use thiserror::Error;

/// Invalid chain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainConfigError {
    /// The token ratio must be at least one.
    #[error("token ratio must be non-zero")]
    ZeroTokenRatio,
}

/// Execution payload rejected by the fork rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Post-fork payloads must carry a withdrawals root.
    #[error("missing withdrawalsRoot after token ratio fork (timestamp {timestamp})")]
    MissingWithdrawalsRoot { timestamp: u64 },

    /// Pre-fork payloads must not carry a withdrawals root.
    #[error("non-nil withdrawalsRoot before token ratio fork (timestamp {timestamp})")]
    UnexpectedWithdrawalsRoot { timestamp: u64 },
}

/// Decoded outcome whose reason disagrees with its status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    /// `status` is failed but `reason` is empty.
    #[error("failed outcome without a reason")]
    MissingReason,

    /// `status` is confirmed but `reason` is set.
    #[error("confirmed outcome with reason {0:?}")]
    UnexpectedReason(String),
}
