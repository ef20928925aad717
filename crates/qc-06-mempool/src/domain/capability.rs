//! # Pool Capability Policy
//!
//! Static composition of the pool variants. The coordinator asks the pool a
//! transaction is routed to whether it supports the preconf fast path, and
//! the answer depends only on the variant.

use super::blob_pool::BlobPool;
use super::entities::{Hash, PreconfStatus, SignedTransaction};
use super::errors::AdmissionError;
use super::pool::LegacyPool;
use crate::ports::inbound::{PoolAdmission, PreconfCapability};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// A pool variant.
#[derive(Debug, Clone)]
pub enum TxPool {
    /// The standard pool.
    Legacy(Arc<LegacyPool>),
    /// The blob pool.
    Blob(Arc<BlobPool>),
}

impl TxPool {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "legacy",
            Self::Blob(_) => "blob",
        }
    }

    fn capability(&self) -> &dyn PreconfCapability {
        match self {
            Self::Legacy(pool) => pool.as_ref(),
            Self::Blob(pool) => pool.as_ref(),
        }
    }

    /// Runs `eval` if this pool supports preconf.
    ///
    /// Returns `Ok(None)` (not handled) without invoking `eval` otherwise.
    pub async fn evaluate_preconf<F, Fut, T, E>(&self, eval: F) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.supports_preconf() {
            return Ok(None);
        }
        eval().await.map(Some)
    }
}

impl PreconfCapability for TxPool {
    fn supports_preconf(&self) -> bool {
        self.capability().supports_preconf()
    }

    fn set_preconf_status(&self, hash: Hash, status: PreconfStatus) {
        self.capability().set_preconf_status(hash, status);
    }

    fn pending_preconf_txs(&self) -> Vec<SignedTransaction> {
        self.capability().pending_preconf_txs()
    }

    fn preconf_ready(&self) -> bool {
        self.capability().preconf_ready()
    }
}

#[async_trait]
impl PoolAdmission for TxPool {
    async fn admit(&self, tx: SignedTransaction) -> Result<(), AdmissionError> {
        match self {
            Self::Legacy(pool) => pool.admit(tx).await,
            Self::Blob(pool) => pool.admit(tx).await,
        }
    }
}

/// The node's pools, with routing by transaction class.
#[derive(Debug, Clone)]
pub struct PoolSet {
    legacy: Arc<LegacyPool>,
    blob: Arc<BlobPool>,
}

impl PoolSet {
    /// Creates a pool set.
    pub fn new(legacy: LegacyPool, blob: BlobPool) -> Self {
        Self {
            legacy: Arc::new(legacy),
            blob: Arc::new(blob),
        }
    }

    /// The standard pool.
    pub fn legacy(&self) -> &Arc<LegacyPool> {
        &self.legacy
    }

    /// The blob pool.
    pub fn blob(&self) -> &Arc<BlobPool> {
        &self.blob
    }

    /// Picks the pool `tx` belongs to: blob-carrying transactions go to the
    /// blob pool, all others to the legacy pool.
    pub fn route(&self, tx: &SignedTransaction) -> TxPool {
        if tx.carries_blobs() {
            TxPool::Blob(Arc::clone(&self.blob))
        } else {
            TxPool::Legacy(Arc::clone(&self.legacy))
        }
    }

    /// Confirmed-preconf transactions across all pools.
    pub fn pending_preconf_txs(&self) -> Vec<SignedTransaction> {
        let mut txs = self.legacy.pending_preconf_txs();
        txs.extend(self.blob.pending_preconf_txs());
        txs
    }
}

impl Default for PoolSet {
    fn default() -> Self {
        Self::new(LegacyPool::with_defaults(), BlobPool::with_defaults())
    }
}

#[async_trait]
impl PoolAdmission for PoolSet {
    async fn admit(&self, tx: SignedTransaction) -> Result<(), AdmissionError> {
        self.route(&tx).admit(tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{BlobPayload, U256};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn create_tx(blob: bool) -> SignedTransaction {
        SignedTransaction {
            from: [0xAA; 20],
            to: Some([0xCC; 20]),
            nonce: 0,
            gas_limit: 21_000,
            gas_price: U256::one(),
            value: U256::zero(),
            data: vec![],
            blob: blob.then(|| BlobPayload {
                versioned_hashes: vec![[0x01; 32]],
                blob_fee_cap: U256::one(),
            }),
            signature: [0u8; 64],
        }
    }

    #[test]
    fn test_routing_by_class() {
        let pools = PoolSet::default();
        assert!(matches!(pools.route(&create_tx(false)), TxPool::Legacy(_)));
        assert!(matches!(pools.route(&create_tx(true)), TxPool::Blob(_)));
        assert_eq!(pools.route(&create_tx(true)).kind(), "blob");
    }

    #[tokio::test]
    async fn test_unsupported_pool_skips_evaluation() {
        let pools = PoolSet::default();
        let flag = AtomicBool::new(false);
        let invoked = &flag;

        let handled: Result<Option<u32>, ()> = pools
            .route(&create_tx(true))
            .evaluate_preconf(move || async move {
                invoked.store(true, Ordering::SeqCst);
                Ok(1)
            })
            .await;

        assert_eq!(handled, Ok(None));
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_supported_pool_runs_evaluation() {
        let pools = PoolSet::default();

        let handled: Result<Option<u32>, &str> = pools
            .route(&create_tx(false))
            .evaluate_preconf(|| async { Ok(7) })
            .await;
        assert_eq!(handled, Ok(Some(7)));

        let failed: Result<Option<u32>, &str> = pools
            .route(&create_tx(false))
            .evaluate_preconf(|| async { Err("boom") })
            .await;
        assert_eq!(failed, Err("boom"));
    }

    #[tokio::test]
    async fn test_admission_routes_to_owning_pool() {
        let pools = PoolSet::default();
        pools.admit(create_tx(false)).await.unwrap();
        pools.admit(create_tx(true)).await.unwrap();

        assert_eq!(pools.legacy().len(), 1);
        assert_eq!(pools.blob().len(), 1);
    }

    #[test]
    fn test_status_through_variant() {
        let pools = PoolSet::default();
        let tx = create_tx(false);
        pools.legacy().add(tx.clone()).unwrap();

        pools
            .route(&tx)
            .set_preconf_status(tx.hash(), PreconfStatus::Confirmed);
        assert_eq!(pools.pending_preconf_txs(), vec![tx]);
    }
}
