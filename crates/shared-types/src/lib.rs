//! # Shared Types Crate
//!
//! Domain entities shared by the state transition, mempool and
//! preconfirmation subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: transactions, accounts and block context are
//!   defined once here and borrowed everywhere else.
//! - **Explicit Fork Parameters**: hard-fork activation and the token ratio
//!   come from [`ChainSpec`]; nothing downstream compares timestamps against
//!   constants.
//! - **Stable Wire Contract**: [`PreconfOutcome`] serializes with the
//!   `txHash` / `status` / `reason` field names consumed by RPC callers.
//!
//! ## Embedder Helpers
//!
//! The workspace never builds or imports execution payloads. The consensus
//! layer that does calls [`ChainSpec::check_withdrawals_root`] (or the free
//! [`check_withdrawals_root`] with any [`ForkOracle`]) when it validates one.

pub mod chain;
pub mod entities;
pub mod errors;
pub mod payload;
pub mod preconf;

pub use chain::{ChainSpec, ForkOracle, RefundRules, TokenRatio};
pub use entities::*;
pub use errors::*;
pub use payload::check_withdrawals_root;
pub use preconf::{PreconfOutcome, PreconfStatus, PreconfVerdict};
