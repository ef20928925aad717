//! Coordinator configuration from environment variables.

use shared_bus::InMemoryEventBus;
use shared_types::entities::{parse_address, Address, SignedTransaction};
use std::collections::HashSet;
use std::env;
use std::time::Duration;
use tracing::warn;

/// Default time a submitter waits for a verdict.
pub const DEFAULT_PRECONF_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the preconfirmation coordinator.
#[derive(Debug, Clone)]
pub struct PreconfConfig {
    /// How long `submit_with_preconf` waits for the verdict.
    pub timeout: Duration,

    /// Destinations eligible for preconf. Empty admits every destination.
    pub to_allowlist: HashSet<Address>,

    /// Per-subscriber event buffer for the bus built by [`PreconfConfig::event_bus`].
    pub event_capacity: usize,
}

impl Default for PreconfConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PRECONF_TIMEOUT,
            to_allowlist: HashSet::new(),
            event_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl PreconfConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_PRECONF_TIMEOUT_MS`: Verdict wait in milliseconds (default: 1000)
    /// - `QC_PRECONF_TO_ADDRS`: Comma-separated hex destinations (default: all)
    /// - `QC_PRECONF_EVENT_CAPACITY`: Events buffered per subscriber (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            timeout: env::var("QC_PRECONF_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .map_or(defaults.timeout, Duration::from_millis),

            to_allowlist: env::var("QC_PRECONF_TO_ADDRS")
                .map(|v| parse_allowlist(&v))
                .unwrap_or_default(),

            event_capacity: env::var("QC_PRECONF_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.event_capacity),
        }
    }

    /// Whether `tx` is eligible for speculative evaluation.
    pub fn allows(&self, tx: &SignedTransaction) -> bool {
        self.to_allowlist.is_empty()
            || tx.to.is_some_and(|to| self.to_allowlist.contains(&to))
    }

    /// Build an event bus sized by `event_capacity`.
    pub fn event_bus(&self) -> InMemoryEventBus {
        InMemoryEventBus::with_capacity(self.event_capacity)
    }
}

fn parse_allowlist(value: &str) -> HashSet<Address> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = parse_address(entry);
            if parsed.is_none() {
                warn!(entry, "Ignoring malformed preconf destination");
            }
            parsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::U256;

    fn call_to(to: Option<Address>) -> SignedTransaction {
        SignedTransaction {
            from: [0xAA; 20],
            to,
            nonce: 0,
            gas_limit: 21_000,
            gas_price: U256::one(),
            value: U256::zero(),
            data: vec![],
            blob: None,
            signature: [0u8; 64],
        }
    }

    #[test]
    fn test_default_config() {
        let config = PreconfConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert!(config.to_allowlist.is_empty());
        assert_eq!(config.event_bus().capacity(), 1000);
    }

    #[test]
    fn test_parse_allowlist_skips_malformed() {
        let list = parse_allowlist(
            " 0x71920e3cb420fbd8ba9a495e6f801c50375ea127, nope ,,0x5FbDB2315678afecb367f032d93F642f64180aa3",
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_empty_allowlist_admits_everything() {
        let config = PreconfConfig::default();
        assert!(config.allows(&call_to(Some([0x01; 20]))));
        assert!(config.allows(&call_to(None)));
    }

    #[test]
    fn test_allowlist_restricts_destinations() {
        let config = PreconfConfig {
            to_allowlist: HashSet::from([[0x01; 20]]),
            ..PreconfConfig::default()
        };
        assert!(config.allows(&call_to(Some([0x01; 20]))));
        assert!(!config.allows(&call_to(Some([0x02; 20]))));
        assert!(!config.allows(&call_to(None)));
    }
}
