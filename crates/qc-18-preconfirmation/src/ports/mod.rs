//! Ports layer for the Pre-Confirmation subsystem.

pub mod outbound;

pub use outbound::*;
