//! Executor output and finalized transition result.

use crate::errors::ExecutionError;

/// What the EVM collaborator reports back after running a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// Unconsumed gas.
    pub gas_remaining: u64,
    /// Refund accumulated during execution.
    pub refund_counter: u64,
    /// Execution failure, if any.
    pub error: Option<ExecutionError>,
    /// Return or revert data.
    pub return_data: Vec<u8>,
}

impl ExecutionOutput {
    /// Successful execution.
    #[must_use]
    pub fn success(gas_remaining: u64, refund_counter: u64) -> Self {
        Self {
            gas_remaining,
            refund_counter,
            error: None,
            return_data: Vec::new(),
        }
    }

    /// Failed execution.
    #[must_use]
    pub fn failure(gas_remaining: u64, error: ExecutionError) -> Self {
        let return_data = match &error {
            ExecutionError::Revert(data) => data.clone(),
            _ => Vec::new(),
        };
        Self {
            gas_remaining,
            refund_counter: 0,
            error: Some(error),
            return_data,
        }
    }
}

/// Finalized gas figures of one applied transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// Intrinsic gas charged up front.
    pub intrinsic_gas: u64,
    /// `gas_limit - gas_remaining`.
    pub gas_used: u64,
    /// Refund granted under the active rules.
    pub refund: u64,
    /// `gas_used - refund`.
    pub gas_charged: u64,
    /// Execution failure, if any.
    pub failure: Option<ExecutionError>,
    /// Return or revert data.
    pub return_data: Vec<u8>,
}

impl TransitionResult {
    /// Whether execution succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Stable failure reason, if execution failed.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        self.failure.as_ref().map(ExecutionError::reason)
    }
}
