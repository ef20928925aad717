//! # Inbound Ports
//!
//! APIs the pools expose to the preconfirmation coordinator and to the
//! block builder.

use crate::domain::{AdmissionError, Hash, PreconfStatus, SignedTransaction};
use async_trait::async_trait;

/// Opt-in to the speculative pre-confirmation fast path.
///
/// `supports_preconf` is fixed when the pool is constructed and must be
/// cheap to query.
pub trait PreconfCapability: Send + Sync {
    /// Whether transactions routed to this pool are evaluated speculatively.
    fn supports_preconf(&self) -> bool;

    /// Record the verdict for `hash`. No-op on pools that do not support preconf.
    fn set_preconf_status(&self, hash: Hash, status: PreconfStatus);

    /// Admitted transactions carrying a confirmed preconf, ordered by sender
    /// then nonce, for the block builder to include first.
    fn pending_preconf_txs(&self) -> Vec<SignedTransaction>;

    /// Whether the pool has finished start-up and accepts preconf traffic.
    fn preconf_ready(&self) -> bool;
}

/// Normal, non-speculative admission.
#[async_trait]
pub trait PoolAdmission: Send + Sync {
    /// Adds `tx` to the pool.
    ///
    /// # Errors
    /// - `Duplicate`: hash already present
    /// - `NonceConflict`: sender already has a transaction at this nonce
    /// - `AccountLimitReached` / `PoolFull`: capacity exhausted
    /// - `WrongPool`: transaction class belongs to another pool
    async fn admit(&self, tx: SignedTransaction) -> Result<(), AdmissionError>;
}
