//! # Legacy Pool - Standard Transaction Pool
//!
//! Holds non-blob transactions and supports the preconf fast path.
//!
//! ## Data Structures
//!
//! - `by_hash`: O(1) lookup by transaction hash
//! - `by_sender`: nonce-ordered transactions per account
//! - `preconf`: verdicts recorded by the coordinator, keyed by hash
//!
//! A verdict is only kept while its transaction is a member: statuses for
//! unknown hashes are dropped, and `remove` clears both.

use super::entities::{Address, Hash, PoolConfig, PooledTransaction, PreconfStatus, SignedTransaction};
use super::errors::AdmissionError;
use qc_11_state_transition::domain::intrinsic::intrinsic_gas;
use crate::ports::inbound::{PoolAdmission, PreconfCapability};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::entities::hash_hex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
struct PoolIndex {
    /// All transactions indexed by hash.
    by_hash: HashMap<Hash, PooledTransaction>,

    /// Transactions grouped by sender, ordered by nonce.
    by_sender: BTreeMap<Address, BTreeMap<u64, Hash>>,

    /// Preconf verdicts by transaction hash.
    preconf: HashMap<Hash, PreconfStatus>,
}

/// The standard pool.
#[derive(Debug)]
pub struct LegacyPool {
    config: PoolConfig,
    index: RwLock<PoolIndex>,
    ready: AtomicBool,
}

impl LegacyPool {
    /// Creates a new empty pool. Preconf traffic is refused until
    /// [`LegacyPool::mark_preconf_ready`] is called.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            index: RwLock::new(PoolIndex::default()),
            ready: AtomicBool::new(false),
        }
    }

    /// Creates a pool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default())
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Signals that start-up has finished.
    pub fn mark_preconf_ready(&self) {
        if !self.ready.swap(true, Ordering::SeqCst) {
            debug!("Legacy pool ready for preconf traffic");
        }
    }

    /// Returns the number of transactions in the pool.
    pub fn len(&self) -> usize {
        self.index.read().by_hash.len()
    }

    /// Returns true if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.index.read().by_hash.is_empty()
    }

    /// Checks if a transaction exists in the pool.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.index.read().by_hash.contains_key(hash)
    }

    /// Gets a transaction by hash.
    pub fn get(&self, hash: &Hash) -> Option<SignedTransaction> {
        self.index
            .read()
            .by_hash
            .get(hash)
            .map(|pooled| pooled.transaction.clone())
    }

    /// Recorded preconf verdict for `hash`.
    pub fn preconf_status(&self, hash: &Hash) -> Option<PreconfStatus> {
        self.index.read().preconf.get(hash).copied()
    }

    /// Removes a transaction and its verdict (after inclusion).
    pub fn remove(&self, hash: &Hash) -> Option<SignedTransaction> {
        let mut index = self.index.write();
        index.preconf.remove(hash);
        let pooled = index.by_hash.remove(hash)?;

        if let Some(nonces) = index.by_sender.get_mut(&pooled.sender) {
            nonces.remove(&pooled.nonce);
            if nonces.is_empty() {
                index.by_sender.remove(&pooled.sender);
            }
        }
        Some(pooled.transaction)
    }

    /// Adds a transaction to the pool.
    ///
    /// # Errors
    /// - `WrongPool` if the transaction carries blobs
    /// - `IntrinsicGasTooLow` if the gas limit cannot cover intrinsic gas
    /// - `Duplicate` if hash already exists
    /// - `NonceConflict` if the sender already has this nonce pending
    /// - `AccountLimitReached` if sender has too many transactions
    /// - `PoolFull` if at capacity
    pub fn add(&self, tx: SignedTransaction) -> Result<(), AdmissionError> {
        let pooled = PooledTransaction::new(tx);
        if pooled.transaction.carries_blobs() {
            return Err(AdmissionError::WrongPool(pooled.hash));
        }
        let want = intrinsic_gas(&pooled.transaction);
        if pooled.transaction.gas_limit < want {
            return Err(AdmissionError::IntrinsicGasTooLow {
                have: pooled.transaction.gas_limit,
                want,
            });
        }

        let mut index = self.index.write();

        if index.by_hash.contains_key(&pooled.hash) {
            return Err(AdmissionError::Duplicate(pooled.hash));
        }

        let sender_txs = index.by_sender.get(&pooled.sender);
        if sender_txs.is_some_and(|nonces| nonces.contains_key(&pooled.nonce)) {
            return Err(AdmissionError::NonceConflict {
                address: pooled.sender,
                nonce: pooled.nonce,
            });
        }
        if sender_txs.map_or(0, BTreeMap::len) >= self.config.max_per_account {
            return Err(AdmissionError::AccountLimitReached {
                address: pooled.sender,
                limit: self.config.max_per_account,
            });
        }
        if index.by_hash.len() >= self.config.max_transactions {
            return Err(AdmissionError::PoolFull {
                capacity: self.config.max_transactions,
            });
        }

        debug!(tx_hash = %hash_hex(&pooled.hash), nonce = pooled.nonce, "Transaction admitted");
        index
            .by_sender
            .entry(pooled.sender)
            .or_default()
            .insert(pooled.nonce, pooled.hash);
        index.by_hash.insert(pooled.hash, pooled);
        Ok(())
    }
}

impl Default for LegacyPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PreconfCapability for LegacyPool {
    fn supports_preconf(&self) -> bool {
        true
    }

    fn set_preconf_status(&self, hash: Hash, status: PreconfStatus) {
        let mut index = self.index.write();
        if index.by_hash.contains_key(&hash) {
            index.preconf.insert(hash, status);
        }
    }

    fn pending_preconf_txs(&self) -> Vec<SignedTransaction> {
        let index = self.index.read();
        index
            .by_sender
            .values()
            .flat_map(BTreeMap::values)
            .filter(|hash| index.preconf.get(*hash) == Some(&PreconfStatus::Confirmed))
            .filter_map(|hash| index.by_hash.get(hash))
            .map(|pooled| pooled.transaction.clone())
            .collect()
    }

    fn preconf_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolAdmission for LegacyPool {
    async fn admit(&self, tx: SignedTransaction) -> Result<(), AdmissionError> {
        self.add(tx)
    }
}
