//! Mempool error types.

use super::entities::{Address, Hash};
use shared_types::entities::{address_hex, hash_hex};
use thiserror::Error;

/// Why a pool refused a transaction on the normal admission path.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Transaction already exists in the pool.
    #[error("already known: {}", hash_hex(.0))]
    Duplicate(Hash),

    /// Another transaction from the same sender already holds this nonce.
    #[error("nonce {nonce} already pending for {}", address_hex(.address))]
    NonceConflict { address: Address, nonce: u64 },

    /// Sender has reached its pending transaction limit.
    #[error("account {} reached limit of {limit} transactions", address_hex(.address))]
    AccountLimitReached { address: Address, limit: usize },

    /// Gas limit does not cover the intrinsic cost; the transaction can never run.
    #[error("intrinsic gas too low: have {have}, want {want}")]
    IntrinsicGasTooLow { have: u64, want: u64 },

    /// Pool has reached maximum capacity.
    #[error("pool full at {capacity} transactions")]
    PoolFull { capacity: usize },

    /// Transaction class does not belong to this pool.
    #[error("transaction {} routed to the wrong pool", hash_hex(.0))]
    WrongPool(Hash),
}
