//! # Preconfirmation Events
//!
//! Events flowing through the preconf feed. Two kinds exist: a request
//! notice emitted when a submission is accepted for evaluation, and the
//! terminal outcome.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, Hash};
use shared_types::preconf::PreconfOutcome;

/// All events that can be published to the preconf feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreconfEvent {
    /// A transaction was submitted for preconfirmation.
    TxRequest {
        /// Hash of the submitted transaction.
        tx_hash: Hash,
        /// Sender of the transaction.
        from: Address,
        /// Sender nonce.
        nonce: u64,
    },

    /// Terminal verdict of one evaluation.
    TxOutcome(PreconfOutcome),
}

impl PreconfEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TxRequest { .. } => EventTopic::PreconfRequest,
            Self::TxOutcome(_) => EventTopic::PreconfOutcome,
        }
    }

    /// Hash of the transaction this event is about.
    #[must_use]
    pub fn tx_hash(&self) -> Hash {
        match self {
            Self::TxRequest { tx_hash, .. } => *tx_hash,
            Self::TxOutcome(outcome) => outcome.tx_hash(),
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Submission notices.
    PreconfRequest,
    /// Terminal outcomes.
    PreconfOutcome,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Transaction hashes to include. Empty means all transactions.
    pub tx_hashes: Vec<Hash>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            tx_hashes: Vec::new(),
        }
    }

    /// Only outcomes.
    #[must_use]
    pub fn outcomes() -> Self {
        Self::topics(vec![EventTopic::PreconfOutcome])
    }

    /// Only the outcome of one transaction.
    #[must_use]
    pub fn outcome_of(tx_hash: Hash) -> Self {
        Self {
            topics: vec![EventTopic::PreconfOutcome],
            tx_hashes: vec![tx_hash],
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &PreconfEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let hash_match = self.tx_hashes.is_empty() || self.tx_hashes.contains(&event.tx_hash());

        topic_match && hash_match
    }
}
