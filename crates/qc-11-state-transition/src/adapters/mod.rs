//! # Adapters
//!
//! In-memory implementations of the outbound ports, used by tests and by
//! embedders that run without a real state database.

pub mod executor;
pub mod snapshot;

pub use executor::{Behavior, ScriptedExecutor};
pub use snapshot::InMemorySnapshot;
