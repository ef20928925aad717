//! # Blob Pool
//!
//! Holds blob-carrying transactions. Their sidecars are too large for
//! synchronous re-execution, so this pool declines the preconf fast path:
//! every preconf hook is a no-op and callers observe the "not evaluated"
//! sentinel.

use super::entities::{Hash, PoolConfig, PooledTransaction, PreconfStatus, SignedTransaction};
use super::errors::AdmissionError;
use qc_11_state_transition::domain::intrinsic::intrinsic_gas;
use crate::ports::inbound::{PoolAdmission, PreconfCapability};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Pool for blob-carrying transactions.
#[derive(Debug)]
pub struct BlobPool {
    config: PoolConfig,
    by_hash: RwLock<HashMap<Hash, PooledTransaction>>,
}

impl BlobPool {
    /// Creates a new empty blob pool.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            by_hash: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a pool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default())
    }

    /// No-op: the blob pool never serves preconf traffic.
    pub fn mark_preconf_ready(&self) {}

    /// Returns the number of transactions in the pool.
    pub fn len(&self) -> usize {
        self.by_hash.read().len()
    }

    /// Returns true if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_hash.read().is_empty()
    }

    /// Checks if a transaction exists in the pool.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.read().contains_key(hash)
    }

    /// Adds a blob-carrying transaction.
    ///
    /// Fee and eviction policy are left to the block builder.
    pub fn add(&self, tx: SignedTransaction) -> Result<(), AdmissionError> {
        let pooled = PooledTransaction::new(tx);
        if !pooled.transaction.carries_blobs() {
            return Err(AdmissionError::WrongPool(pooled.hash));
        }
        let want = intrinsic_gas(&pooled.transaction);
        if pooled.transaction.gas_limit < want {
            return Err(AdmissionError::IntrinsicGasTooLow {
                have: pooled.transaction.gas_limit,
                want,
            });
        }

        let mut by_hash = self.by_hash.write();
        if by_hash.contains_key(&pooled.hash) {
            return Err(AdmissionError::Duplicate(pooled.hash));
        }
        if by_hash.len() >= self.config.max_transactions {
            return Err(AdmissionError::PoolFull {
                capacity: self.config.max_transactions,
            });
        }
        by_hash.insert(pooled.hash, pooled);
        Ok(())
    }
}

impl Default for BlobPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PreconfCapability for BlobPool {
    fn supports_preconf(&self) -> bool {
        false
    }

    fn set_preconf_status(&self, _hash: Hash, _status: PreconfStatus) {}

    fn pending_preconf_txs(&self) -> Vec<SignedTransaction> {
        Vec::new()
    }

    fn preconf_ready(&self) -> bool {
        false
    }
}

#[async_trait]
impl PoolAdmission for BlobPool {
    async fn admit(&self, tx: SignedTransaction) -> Result<(), AdmissionError> {
        self.add(tx)
    }
}
