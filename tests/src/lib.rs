//! # Quantum-Chain Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/        # Cross-subsystem flows
//!     ├── token.rs        # Token contract stand-in for the EVM
//!     └── preconf_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
