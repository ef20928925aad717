//! # Ports
//!
//! Interfaces to the collaborators this subsystem does not implement.

pub mod outbound;
