//! Core domain entities for the Mempool subsystem.

// Re-export from shared-types for convenience
pub use shared_types::{Address, Hash, PreconfStatus, SignedTransaction, U256};

/// Pool sizing limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of transactions held by one pool.
    pub max_transactions: usize,
    /// Maximum number of pending transactions per sender.
    pub max_per_account: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 5000,
            max_per_account: 16,
        }
    }
}

impl PoolConfig {
    /// Creates a config for testing with small limits.
    pub fn for_testing() -> Self {
        Self {
            max_transactions: 8,
            max_per_account: 4,
        }
    }
}

/// A transaction held by a pool, with its cached identity.
#[derive(Clone, Debug)]
pub struct PooledTransaction {
    /// The signed transaction.
    pub transaction: SignedTransaction,
    /// Transaction hash (unique identifier).
    pub hash: Hash,
    /// Sender address.
    pub sender: Address,
    /// Sender's nonce for this transaction.
    pub nonce: u64,
}

impl PooledTransaction {
    /// Wraps a signed transaction.
    pub fn new(transaction: SignedTransaction) -> Self {
        let hash = transaction.hash();
        let sender = transaction.sender();
        let nonce = transaction.nonce;
        Self {
            transaction,
            hash,
            sender,
            nonce,
        }
    }
}
