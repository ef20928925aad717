//! Cross-subsystem integration flows.

pub mod preconf_flows;
pub mod token;
