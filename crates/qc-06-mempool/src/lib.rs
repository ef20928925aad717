//! # Transaction Pool (Mempool) Subsystem
//!
//! **Subsystem ID:** 6
//!
//! ## Purpose
//!
//! Holds unconfirmed transactions awaiting block inclusion and tells the
//! preconfirmation coordinator whether each pool takes part in the
//! speculative fast path.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | No duplicate transactions | `domain/pool.rs`, `domain/blob_pool.rs` - `add()` check |
//! | One transaction per sender nonce | `domain/pool.rs` - `by_sender` BTreeMap keys |
//! | Gas limit covers intrinsic gas | `domain/pool.rs`, `domain/blob_pool.rs` - `add()` check |
//! | Statuses only for members | `domain/pool.rs` - `set_preconf_status()` |
//! | Capability fixed per pool variant | `domain/capability.rs` - `TxPool::supports_preconf()` |
//! | Unsupported pools never evaluate | `domain/capability.rs` - `TxPool::evaluate_preconf()` |
//!
//! ## Pool Variants
//!
//! | Pool | Transactions | Preconf |
//! |------|--------------|---------|
//! | `LegacyPool` | all non-blob | yes, after `mark_preconf_ready()` |
//! | `BlobPool` | blob-carrying | no (sentinel) |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - PreconfCapability, PoolAdmission traits    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs   - PooledTransaction, PoolConfig           │
//! │  domain/pool.rs       - LegacyPool                              │
//! │  domain/blob_pool.rs  - BlobPool                                │
//! │  domain/capability.rs - TxPool, PoolSet                         │
//! │  domain/errors.rs     - AdmissionError enum                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::*;
