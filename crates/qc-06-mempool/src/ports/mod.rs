//! Ports layer for Mempool subsystem.
//!
//! Inbound (driving) ports only: the pool has no outbound dependencies.

pub mod inbound;

pub use inbound::*;
