//! # Core Domain Entities
//!
//! Transactions, accounts and block context as seen by the execution layer.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

pub use primitive_types::U256;

// =============================================================================
// PRIMITIVES
// =============================================================================

/// 32-byte hash (Keccak-256).
pub type Hash = [u8; 32];

/// 64-byte signature (r, s).
pub type Signature = [u8; 64];

/// 20-byte account address.
pub type Address = [u8; 20];

/// Formats a hash as `0x`-prefixed lowercase hex.
#[must_use]
pub fn hash_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Formats an address as `0x`-prefixed lowercase hex.
#[must_use]
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parses a `0x`-prefixed (or bare) hex address.
pub fn parse_address(input: &str) -> Option<Address> {
    let digits = input.trim().trim_start_matches("0x");
    let bytes = hex::decode(digits).ok()?;
    bytes.try_into().ok()
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Blob commitments attached to a blob-carrying transaction.
///
/// Only the versioned hashes are kept here; the sidecar itself lives in the
/// blob pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobPayload {
    /// Versioned hashes of the KZG commitments.
    pub versioned_hashes: Vec<Hash>,
    /// Maximum fee per blob gas.
    pub blob_fee_cap: U256,
}

/// A signed transaction as submitted by a client.
///
/// Immutable once signed; identified by [`SignedTransaction::hash`].
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Sender address (recovered from the signature upstream).
    pub from: Address,
    /// Recipient address (`None` for contract creation).
    pub to: Option<Address>,
    /// Sender's nonce.
    pub nonce: u64,
    /// Gas limit for this transaction.
    pub gas_limit: u64,
    /// Gas price (fee cap) in base units.
    pub gas_price: U256,
    /// Value transferred in base units.
    pub value: U256,
    /// Call data or init code.
    pub data: Vec<u8>,
    /// Blob commitments, present only on blob-carrying transactions.
    pub blob: Option<BlobPayload>,
    /// ECDSA signature (r, s).
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl SignedTransaction {
    /// Compute the transaction hash.
    pub fn hash(&self) -> Hash {
        use sha3::{Digest, Keccak256};
        let mut hasher = Keccak256::new();
        hasher.update(self.from);
        match &self.to {
            Some(to) => {
                hasher.update([1u8]);
                hasher.update(to);
            }
            None => hasher.update([0u8]),
        }
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(self.gas_limit.to_be_bytes());
        let mut word = [0u8; 32];
        self.gas_price.to_big_endian(&mut word);
        hasher.update(word);
        self.value.to_big_endian(&mut word);
        hasher.update(word);
        hasher.update((self.data.len() as u64).to_be_bytes());
        hasher.update(&self.data);
        if let Some(blob) = &self.blob {
            for versioned_hash in &blob.versioned_hashes {
                hasher.update(versioned_hash);
            }
            blob.blob_fee_cap.to_big_endian(&mut word);
            hasher.update(word);
        }
        hasher.update(self.signature);
        hasher.finalize().into()
    }

    /// Returns the sender address.
    pub fn sender(&self) -> Address {
        self.from
    }

    /// Whether this transaction deploys a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Whether this transaction carries blob commitments.
    pub fn carries_blobs(&self) -> bool {
        self.blob.is_some()
    }

    /// Upfront cost `gas_limit * gas_price + value`.
    ///
    /// Returns `None` when the product or sum overflows 256 bits.
    pub fn upfront_cost(&self) -> Option<U256> {
        self.gas_price
            .checked_mul(U256::from(self.gas_limit))?
            .checked_add(self.value)
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Account state as read from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountState {
    /// Balance in base units.
    pub balance: U256,
    /// Next expected nonce.
    pub nonce: u64,
    /// Keccak-256 of the account code (zero for externally owned accounts).
    pub code_hash: Hash,
}

impl AccountState {
    /// Keccak-256 of empty code.
    pub const EMPTY_CODE_HASH: Hash = [
        0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03,
        0xc0, 0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85,
        0xa4, 0x70,
    ];

    /// Creates an externally owned account.
    #[must_use]
    pub fn new_eoa(balance: U256, nonce: u64) -> Self {
        Self {
            balance,
            nonce,
            code_hash: [0u8; 32],
        }
    }

    /// Creates a contract account with the given code hash.
    #[must_use]
    pub fn new_contract(balance: U256, code_hash: Hash) -> Self {
        Self {
            balance,
            nonce: 1,
            code_hash,
        }
    }

    /// Whether the account has deployed code.
    #[must_use]
    pub fn has_code(&self) -> bool {
        self.code_hash != [0u8; 32] && self.code_hash != Self::EMPTY_CODE_HASH
    }
}

/// Block context an evaluation runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Block number.
    pub number: u64,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    /// Block gas limit.
    pub gas_limit: u64,
    /// Base fee per gas.
    pub base_fee: U256,
    /// Fee recipient.
    pub coinbase: Address,
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: 30_000_000,
            base_fee: U256::zero(),
            coinbase: [0u8; 20],
        }
    }
}
