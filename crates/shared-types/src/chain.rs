//! # Chain Parameters
//!
//! Hard-fork activation and the token ratio, supplied by the embedder.
//!
//! Everything fork-gated in the refund path is looked up once per block
//! context through [`ForkOracle::refund_rules`] and passed down as a
//! [`RefundRules`] value.

use crate::errors::{ChainConfigError, PayloadError};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Ratio between the chain's native gas-priced unit and the reference unit.
///
/// Always at least one; a zero ratio cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TokenRatio(NonZeroU64);

impl TokenRatio {
    /// The identity ratio.
    pub const ONE: Self = Self(NonZeroU64::MIN);

    /// Creates a ratio, rejecting zero.
    pub fn new(ratio: u64) -> Result<Self, ChainConfigError> {
        NonZeroU64::new(ratio)
            .map(Self)
            .ok_or(ChainConfigError::ZeroTokenRatio)
    }

    /// Returns the raw ratio.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for TokenRatio {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u64> for TokenRatio {
    type Error = ChainConfigError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TokenRatio> for u64 {
    fn from(ratio: TokenRatio) -> Self {
        ratio.get()
    }
}

/// Refund parameters in force for one block context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefundRules {
    /// Whether the token-ratio refund formula is active.
    pub post_fork_active: bool,
    /// Token ratio; only consulted when `post_fork_active` is set.
    pub token_ratio: TokenRatio,
}

impl RefundRules {
    /// Rules before the fork.
    #[must_use]
    pub fn pre_fork() -> Self {
        Self::default()
    }

    /// Rules after the fork with the given ratio.
    #[must_use]
    pub fn post_fork(token_ratio: TokenRatio) -> Self {
        Self {
            post_fork_active: true,
            token_ratio,
        }
    }
}

/// Hard-fork activation oracle.
pub trait ForkOracle: Send + Sync {
    /// Whether the token-ratio fork is active at `timestamp`.
    fn is_post_fork_active(&self, timestamp: u64) -> bool;

    /// The configured token ratio.
    fn token_ratio(&self) -> TokenRatio;

    /// Refund rules for a block with the given timestamp.
    fn refund_rules(&self, timestamp: u64) -> RefundRules {
        RefundRules {
            post_fork_active: self.is_post_fork_active(timestamp),
            token_ratio: self.token_ratio(),
        }
    }
}

/// Chain parameters relevant to the execution layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSpec {
    /// EIP-155 chain identifier.
    pub chain_id: u64,
    /// Activation timestamp of the token-ratio fork (`None` = not scheduled).
    pub token_ratio_fork_time: Option<u64>,
    /// Token ratio used once the fork is active.
    pub token_ratio: TokenRatio,
}

impl ChainSpec {
    /// A chain that never activates the fork.
    #[must_use]
    pub fn without_fork(chain_id: u64) -> Self {
        Self {
            chain_id,
            token_ratio_fork_time: None,
            token_ratio: TokenRatio::ONE,
        }
    }

    /// A chain that activates the fork at `fork_time`.
    #[must_use]
    pub fn with_fork(chain_id: u64, fork_time: u64, token_ratio: TokenRatio) -> Self {
        Self {
            chain_id,
            token_ratio_fork_time: Some(fork_time),
            token_ratio,
        }
    }

    /// Fork check for the withdrawals root of a payload at `timestamp`.
    /// See [`crate::payload::check_withdrawals_root`].
    pub fn check_withdrawals_root(
        &self,
        timestamp: u64,
        withdrawals_root: Option<&crate::entities::Hash>,
    ) -> Result<(), PayloadError> {
        crate::payload::check_withdrawals_root(self, timestamp, withdrawals_root)
    }
}

impl ForkOracle for ChainSpec {
    fn is_post_fork_active(&self, timestamp: u64) -> bool {
        self.token_ratio_fork_time
            .is_some_and(|activation| timestamp >= activation)
    }

    fn token_ratio(&self) -> TokenRatio {
        self.token_ratio
    }
}
