//! # QC-18 Pre-Confirmation - Speculative Verdicts
//!
//! **Subsystem ID:** 18
//!
//! ## Purpose
//!
//! Answers "would this transaction succeed if included now, and if not,
//! why" synchronously at submission, without waiting for block inclusion.
//!
//! ## Verdicts
//!
//! | Verdict | Meaning |
//! |---------|---------|
//! | `Confirmed` | Executed successfully against the pending snapshot |
//! | `Failed` | Executed (or failed intrinsic gas) with a stable reason |
//! | `NotEvaluated` | Pool or destination declines the fast path |
//!
//! Validation rejections, infrastructure failures and timeouts are
//! [`PreconfError`]s, never verdicts.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One outcome per evaluation | `domain/evaluation.rs` - `settle()` consumes `Evaluation<Evaluating>` |
//! | Unsupported pools never evaluate | `qc_06_mempool::TxPool::evaluate_preconf()` |
//! | Nonce must be next expected | `qc_11_state_transition::processor` - `pre_check()` |
//! | Publishing never blocks | `shared_bus::InMemoryEventBus` (bounded broadcast) |
//! | Verdict survives caller timeout | `service.rs` - detached evaluation task |
//! | Never-runnable transactions are not admitted | `service.rs` - `process()` via `Settled::dispatched()` |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | State database | `SnapshotSource` | Pending snapshot selection |
//! | EVM | `EvmExecutor` | Speculative execution |
//! | Chain config | `ForkOracle` | Refund rules per block timestamp |
//! | Pools | `PoolAdmission`, `PreconfCapability` | Admission, capability, status |

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use config::PreconfConfig;
pub use errors::PreconfError;
pub use service::{CoordinatorStats, PreconfCoordinator};

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 18;
