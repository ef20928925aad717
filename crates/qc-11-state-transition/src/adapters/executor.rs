//! # Scripted Executor
//!
//! Stand-in for the EVM: every destination address gets a scripted
//! behaviour. Destinations without a script succeed without using gas
//! beyond the intrinsic cost.

use crate::domain::entities::ExecutionOutput;
use crate::domain::revert::encode_revert_reason;
use crate::errors::{ExecutionError, StateError};
use crate::ports::outbound::{EvmExecutor, StateSnapshot};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::entities::{Address, SignedTransaction};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Scripted outcome for calls to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    /// Consume `gas` and accumulate `refund`; runs out of gas if `gas`
    /// exceeds what is available.
    Succeed {
        /// Gas consumed by execution.
        gas: u64,
        /// Refund counter at exit.
        refund: u64,
    },
    /// Consume `gas`, then revert with an optional `Error(string)` reason.
    Revert {
        /// Gas consumed before the revert.
        gas: u64,
        /// Decoded revert message, if any.
        reason: Option<String>,
    },
    /// Halt with `error`, consuming all gas.
    Halt(ExecutionError),
    /// The executor cannot be reached.
    Unreachable,
}

impl Default for Behavior {
    fn default() -> Self {
        Self::Succeed { gas: 0, refund: 0 }
    }
}

/// Executor driven by per-destination scripts.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    scripts: RwLock<HashMap<Address, Behavior>>,
    creation: RwLock<Behavior>,
    latency: Option<Duration>,
    calls: AtomicU64,
}

impl ScriptedExecutor {
    /// Executor where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: delay every execution by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Script calls to `to`.
    pub fn script(&self, to: Address, behavior: Behavior) {
        self.scripts.write().insert(to, behavior);
    }

    /// Script contract creations.
    pub fn script_creation(&self, behavior: Behavior) {
        *self.creation.write() = behavior;
    }

    /// Number of executions dispatched so far.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, tx: &SignedTransaction) -> Behavior {
        match tx.to {
            Some(to) => self.scripts.read().get(&to).cloned().unwrap_or_default(),
            None => self.creation.read().clone(),
        }
    }
}

#[async_trait]
impl EvmExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _snapshot: &dyn StateSnapshot,
        tx: &SignedTransaction,
        gas_available: u64,
    ) -> Result<ExecutionOutput, StateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let output = match self.behavior_for(tx) {
            Behavior::Succeed { gas, refund } if gas <= gas_available => {
                ExecutionOutput::success(gas_available - gas, refund)
            }
            Behavior::Succeed { .. } => ExecutionOutput::failure(0, ExecutionError::OutOfGas),
            Behavior::Revert { gas, .. } if gas > gas_available => {
                ExecutionOutput::failure(0, ExecutionError::OutOfGas)
            }
            Behavior::Revert { gas, reason } => {
                let data = reason
                    .as_deref()
                    .map(encode_revert_reason)
                    .unwrap_or_default();
                ExecutionOutput::failure(gas_available - gas, ExecutionError::Revert(data))
            }
            Behavior::Halt(error) => ExecutionOutput::failure(0, error),
            Behavior::Unreachable => {
                return Err(StateError::ExecutorUnreachable(
                    "scripted executor offline".to_string(),
                ))
            }
        };
        Ok(output)
    }
}
