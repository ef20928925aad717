//! # Driven Ports (SPI - Outbound)
//!
//! State and EVM collaborators consumed by the transition processor.
//!
//! - Dependencies point INWARD (adapters implement these traits)
//! - Snapshots are read-only; nothing here commits state

use crate::domain::entities::ExecutionOutput;
use crate::errors::StateError;
use async_trait::async_trait;
use shared_types::entities::{AccountState, Address, BlockContext, SignedTransaction};

// =============================================================================
// STATE SNAPSHOT
// =============================================================================

/// Read-only view of world state at one block.
///
/// A snapshot is shared by concurrent evaluations and must not reflect
/// transactions admitted after it was taken.
#[async_trait]
pub trait StateSnapshot: Send + Sync {
    /// Account state. Accounts that never existed are returned empty.
    async fn account(&self, address: &Address) -> Result<AccountState, StateError>;

    /// Block context the snapshot was taken at.
    fn block(&self) -> &BlockContext;
}

// =============================================================================
// EVM EXECUTOR
// =============================================================================

/// The EVM collaborator.
///
/// Executes the transaction's code with `gas_available` gas (gas limit
/// minus intrinsic gas) against `snapshot`, discarding all state changes.
#[async_trait]
pub trait EvmExecutor: Send + Sync {
    /// Run the transaction.
    ///
    /// An `Err` means the executor could not run at all; execution failures
    /// are reported in [`ExecutionOutput::error`].
    async fn execute(
        &self,
        snapshot: &dyn StateSnapshot,
        tx: &SignedTransaction,
        gas_available: u64,
    ) -> Result<ExecutionOutput, StateError>;
}
