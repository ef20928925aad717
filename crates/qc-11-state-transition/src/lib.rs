//! # QC-11 State Transition - Speculative Execution Core
//!
//! **Subsystem ID:** 11
//!
//! ## Purpose
//!
//! Applies exactly one transaction to a read-only state snapshot and
//! finalizes its gas: validation, dispatch to the EVM collaborator, gas used,
//! the fork-gated refund, and the gas actually charged.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `gas_remaining <= initial_gas` | `domain/refund.rs` - `GasCounters::new()` |
//! | Refund capped at a fifth of gas used | `domain/refund.rs` - `calc_refund()` |
//! | Token ratio is non-zero | `shared_types::TokenRatio`, `calc_refund_raw()` guard |
//! | Validation failures never reach the executor | `processor.rs` - `pre_check()` |
//! | Snapshots are never written | `ports/outbound.rs` - `StateSnapshot` is read-only |
//!
//! ## Transition Flow
//!
//! ```text
//! [tx] ─→ pre_check ─→ execute(snapshot, gas_limit - intrinsic) ─→ finalize
//!            │                        │                               │
//!            └─ ValidationError       └─ StateError                   └─ TransitionResult
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | State database | `StateSnapshot` | Account reads at a fixed block |
//! | EVM | `EvmExecutor` | Opcode execution, refund counter |

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod processor;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::{Behavior, InMemorySnapshot, ScriptedExecutor};
    pub use crate::domain::entities::{ExecutionOutput, TransitionResult};
    pub use crate::domain::intrinsic::intrinsic_gas;
    pub use crate::domain::refund::{calc_refund, calc_refund_raw, GasCounters, REFUND_QUOTIENT};
    pub use crate::domain::revert::{decode_revert_reason, encode_revert_reason};
    pub use crate::errors::{
        reasons, ExecutionError, InvariantViolation, StateError, TransitionError, ValidationError,
    };
    pub use crate::ports::outbound::{EvmExecutor, StateSnapshot};
    pub use crate::processor::StateTransition;
}

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 11;
