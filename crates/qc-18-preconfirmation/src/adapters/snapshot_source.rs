//! Snapshot source backed by a swappable shared snapshot.

use crate::ports::outbound::SnapshotSource;
use async_trait::async_trait;
use parking_lot::RwLock;
use qc_11_state_transition::errors::StateError;
use qc_11_state_transition::ports::outbound::StateSnapshot;
use std::sync::Arc;
use tracing::debug;

/// Hands out the current pending snapshot. `advance` installs the next one
/// after a block is sealed; evaluations already holding the previous
/// snapshot keep it.
#[derive(Default)]
pub struct SharedSnapshotSource {
    current: RwLock<Option<Arc<dyn StateSnapshot>>>,
}

impl SharedSnapshotSource {
    /// Source serving `snapshot`.
    pub fn new(snapshot: Arc<dyn StateSnapshot>) -> Self {
        Self {
            current: RwLock::new(Some(snapshot)),
        }
    }

    /// Source with no snapshot yet; every request fails as unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Install the next pending snapshot.
    pub fn advance(&self, snapshot: Arc<dyn StateSnapshot>) {
        debug!(block = snapshot.block().number, "Pending snapshot advanced");
        *self.current.write() = Some(snapshot);
    }

    /// Drop the current snapshot.
    pub fn clear(&self) {
        *self.current.write() = None;
    }
}

#[async_trait]
impl SnapshotSource for SharedSnapshotSource {
    async fn pending_snapshot(&self) -> Result<Arc<dyn StateSnapshot>, StateError> {
        self.current.read().clone().ok_or(StateError::Unavailable)
    }
}
