//! # Preconfirmation Wire Types
//!
//! The verdict a submitter observes for a speculatively evaluated
//! transaction. Field names are part of the RPC contract:
//!
//! | Field | Encoding |
//! |-------|----------|
//! | `txHash` | `0x`-prefixed hex, 32 bytes |
//! | `status` | `"confirmed"` or `"failed"` |
//! | `reason` | empty unless `status` is `"failed"` |
//! | `gasUsed` | gas consumed before refund |
//! | `gasCharged` | gas charged after refund |

use crate::entities::Hash;
use crate::errors::OutcomeError;
use serde::{Deserialize, Serialize};

/// Reason used when a failure carries no more specific message.
pub const DEFAULT_FAILURE_REASON: &str = "execution reverted";

/// Terminal status of an evaluated transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreconfStatus {
    /// The transaction would succeed against the evaluated snapshot.
    Confirmed,
    /// The transaction would fail; see the reason.
    Failed,
}

impl PreconfStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

/// Verdict of one evaluation.
///
/// `reason` is non-empty exactly when `status` is [`PreconfStatus::Failed`].
/// The constructors and the checked decoder are the only ways to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "OutcomeWire")]
pub struct PreconfOutcome {
    #[serde(with = "hex_hash")]
    tx_hash: Hash,
    status: PreconfStatus,
    reason: String,
    gas_used: u64,
    gas_charged: u64,
}

impl PreconfOutcome {
    /// A confirmed outcome.
    #[must_use]
    pub fn confirmed(tx_hash: Hash, gas_used: u64, gas_charged: u64) -> Self {
        Self {
            tx_hash,
            status: PreconfStatus::Confirmed,
            reason: String::new(),
            gas_used,
            gas_charged,
        }
    }

    /// A failed outcome. An empty reason is replaced by
    /// [`DEFAULT_FAILURE_REASON`].
    #[must_use]
    pub fn failed(tx_hash: Hash, reason: impl Into<String>, gas_used: u64, gas_charged: u64) -> Self {
        let mut reason = reason.into();
        if reason.is_empty() {
            reason = DEFAULT_FAILURE_REASON.to_string();
        }
        Self {
            tx_hash,
            status: PreconfStatus::Failed,
            reason,
            gas_used,
            gas_charged,
        }
    }

    pub fn tx_hash(&self) -> Hash {
        self.tx_hash
    }

    pub fn status(&self) -> PreconfStatus {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }

    pub fn gas_charged(&self) -> u64 {
        self.gas_charged
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == PreconfStatus::Confirmed
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeWire {
    #[serde(with = "hex_hash")]
    tx_hash: Hash,
    status: PreconfStatus,
    reason: String,
    gas_used: u64,
    gas_charged: u64,
}

impl TryFrom<OutcomeWire> for PreconfOutcome {
    type Error = OutcomeError;

    fn try_from(wire: OutcomeWire) -> Result<Self, Self::Error> {
        match (wire.status, wire.reason.is_empty()) {
            (PreconfStatus::Failed, true) => Err(OutcomeError::MissingReason),
            (PreconfStatus::Confirmed, false) => Err(OutcomeError::UnexpectedReason(wire.reason)),
            (status, _) => Ok(Self {
                tx_hash: wire.tx_hash,
                status,
                reason: wire.reason,
                gas_used: wire.gas_used,
                gas_charged: wire.gas_charged,
            }),
        }
    }
}

/// Result of asking for a preconfirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconfVerdict {
    /// The transaction was speculatively executed.
    Evaluated(PreconfOutcome),
    /// The fast path was not taken; the transaction falls back to ordinary
    /// asynchronous inclusion.
    NotEvaluated {
        /// Hash of the transaction.
        tx_hash: Hash,
    },
}

impl PreconfVerdict {
    /// Hash of the transaction the verdict is about.
    #[must_use]
    pub fn tx_hash(&self) -> Hash {
        match self {
            Self::Evaluated(outcome) => outcome.tx_hash(),
            Self::NotEvaluated { tx_hash } => *tx_hash,
        }
    }

    /// The outcome, if the transaction was evaluated.
    #[must_use]
    pub fn outcome(&self) -> Option<&PreconfOutcome> {
        match self {
            Self::Evaluated(outcome) => Some(outcome),
            Self::NotEvaluated { .. } => None,
        }
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        matches!(self, Self::Evaluated(_))
    }
}

mod hex_hash {
    use crate::entities::Hash;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::entities::hash_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text.strip_prefix("0x").unwrap_or(&text);
        let bytes = hex::decode(digits).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom("txHash must be 32 bytes"))
    }
}
