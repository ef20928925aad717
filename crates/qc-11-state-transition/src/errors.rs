//! # Error Types
//!
//! Error taxonomy for one state transition:
//!
//! - [`ValidationError`]: the transaction cannot be applied to this snapshot.
//! - [`ExecutionError`]: the EVM ran it and it failed (a normal outcome).
//! - [`StateError`]: we could not evaluate it at all.
//! - [`InvariantViolation`]: an upstream bug.

use crate::domain::revert::decode_revert_reason;
use shared_types::entities::{address_hex, Address, U256};
use thiserror::Error;

/// Stable reason strings. Callers match on substrings of these.
pub mod reasons {
    /// Gas limit below the intrinsic cost.
    pub const INTRINSIC_GAS_TOO_LOW: &str = "intrinsic gas too low";
    /// Balance below `gas * price + value`.
    pub const INSUFFICIENT_FUNDS: &str = "insufficient funds for gas * price + value";
    /// Execution exhausted its gas (and every halt class mapped onto it).
    pub const OUT_OF_GAS: &str = "out of gas";
    /// Execution hit REVERT.
    pub const EXECUTION_REVERTED: &str = "execution reverted";
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// The transaction cannot be applied to the snapshot. Never reaches the EVM.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Transaction gas limit above the block gas limit.
    #[error("exceeds block gas limit: tx {limit} > block {block_limit}")]
    GasLimitExceedsBlock { limit: u64, block_limit: u64 },

    /// Nonce already used.
    #[error("nonce too low: address {}, tx: {actual} state: {expected}", address_hex(.address))]
    NonceTooLow {
        address: Address,
        expected: u64,
        actual: u64,
    },

    /// Nonce leaves a gap.
    #[error("nonce too high: address {}, tx: {actual} state: {expected}", address_hex(.address))]
    NonceTooHigh {
        address: Address,
        expected: u64,
        actual: u64,
    },

    /// Sender has deployed code (EIP-3607).
    #[error("sender not an eoa: address {}", address_hex(.address))]
    SenderNotEoa { address: Address },

    /// Balance below the upfront cost. `want` is `U256::MAX` when the cost overflows.
    #[error(
        "insufficient funds for gas * price + value: address {} have {have} want {want}",
        address_hex(.address)
    )]
    InsufficientFunds {
        address: Address,
        have: U256,
        want: U256,
    },

    /// Gas limit below the intrinsic cost.
    #[error("intrinsic gas too low: have {have}, want {want}")]
    IntrinsicGasTooLow { have: u64, want: u64 },
}

// =============================================================================
// EXECUTION ERRORS
// =============================================================================

/// Failures reported by the EVM collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Execution ran out of gas.
    #[error("out of gas")]
    OutOfGas,

    /// Execution reverted; carries the raw return data.
    #[error("execution reverted")]
    Revert(Vec<u8>),

    /// Call depth exceeded 1024.
    #[error("max call depth exceeded")]
    CallDepthExceeded,

    /// Jump to a non-JUMPDEST.
    #[error("invalid jump destination")]
    InvalidJump,

    /// State modification inside STATICCALL.
    #[error("write protection")]
    WriteProtection,

    /// RETURNDATACOPY beyond the buffer.
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// Gas arithmetic overflowed 64 bits.
    #[error("gas uint64 overflow")]
    GasUintOverflow,

    /// Deployed code starts with 0xEF.
    #[error("invalid code: must not begin with 0xef")]
    InvalidCode,

    /// Deployed code above the EIP-170 limit.
    #[error("max code size exceeded")]
    CodeSizeExceeded,

    /// Value transfer inside a call exceeded the caller's balance.
    #[error("insufficient balance for transfer")]
    InsufficientBalanceForTransfer,

    /// CREATE target already has code or nonce.
    #[error("contract address collision")]
    ContractAddressCollision,

    /// Stack above 1024 items.
    #[error("stack overflow")]
    StackOverflow,

    /// Pop from an empty stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// Undefined opcode.
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),
}

impl ExecutionError {
    /// Stable reason string reported to preconf subscribers.
    ///
    /// Reverts carrying an `Error(string)` payload keep the contract's
    /// message; every non-revert halt is reported as out of gas.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Revert(data) => match decode_revert_reason(data) {
                Some(message) if !message.is_empty() => {
                    format!("{}: {message}", reasons::EXECUTION_REVERTED)
                }
                _ => reasons::EXECUTION_REVERTED.to_string(),
            },
            _ => reasons::OUT_OF_GAS.to_string(),
        }
    }

    /// Returns true if this error consumes all gas.
    #[must_use]
    pub fn consumes_all_gas(&self) -> bool {
        !matches!(self, Self::Revert(_))
    }
}

// =============================================================================
// STATE ERRORS
// =============================================================================

/// Infrastructure failures: the transaction was not evaluated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// No snapshot could be obtained.
    #[error("state snapshot unavailable")]
    Unavailable,

    /// State access timed out.
    #[error("state access timeout")]
    Timeout,

    /// State database is corrupted.
    #[error("state corruption detected")]
    Corrupted,

    /// The EVM collaborator could not be reached.
    #[error("executor unreachable: {0}")]
    ExecutorUnreachable(String),

    /// Internal error.
    #[error("internal state error: {0}")]
    Internal(String),
}

// =============================================================================
// INVARIANT VIOLATIONS
// =============================================================================

/// Broken gas accounting reported by a collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// More gas remaining than was handed out.
    #[error("gas remaining {remaining} exceeds initial gas {initial}")]
    GasRemainingExceedsInitial { initial: u64, remaining: u64 },
}

// =============================================================================
// TRANSITION ERROR
// =============================================================================

/// Why a transition produced no result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Rejected before execution.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// State or executor failure.
    #[error(transparent)]
    State(#[from] StateError),

    /// Gas accounting bug.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
