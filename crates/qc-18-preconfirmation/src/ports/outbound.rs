//! # Outbound Ports
//!
//! Collaborators the coordinator drives.
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | State database | `SnapshotSource` | "Pending state as of now" |
//! | EVM | `qc_11_state_transition::ports::outbound::EvmExecutor` | Speculative execution |
//! | Pools | `qc_06_mempool::PoolAdmission` | Normal admission |

use async_trait::async_trait;
use qc_11_state_transition::errors::StateError;
use qc_11_state_transition::ports::outbound::StateSnapshot;
use std::sync::Arc;

/// Supplies the snapshot a submission is evaluated against.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Latest pending state. The returned snapshot is never written.
    async fn pending_snapshot(&self) -> Result<Arc<dyn StateSnapshot>, StateError>;
}
