//! # Type-State Evaluation
//!
//! One submission moves through `Submitted → Evaluating → Settled`. Each
//! transition consumes `self`, so a submission cannot be settled twice and
//! cannot be settled without having been dispatched:
//!
//! ```ignore
//! let submitted = Evaluation::submit(&tx);
//! let evaluating = submitted.begin(rules);
//! let settled = evaluating.settle(result);
//! // evaluating.settle(..);  // COMPILE ERROR: evaluating already consumed
//! ```

use crate::errors::PreconfError;
use qc_11_state_transition::domain::entities::TransitionResult;
use qc_11_state_transition::errors::{TransitionError, ValidationError};
use shared_types::entities::{Address, Hash, SignedTransaction};
use shared_types::{PreconfOutcome, RefundRules};
use std::marker::PhantomData;
use std::time::{Duration, Instant};

// =============================================================================
// STATE MARKERS (Zero-Sized Types)
// =============================================================================

/// Marker: accepted by the coordinator, not yet dispatched.
#[derive(Debug, Clone, Copy)]
pub struct Submitted;

/// Marker: running against a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Evaluating;

// =============================================================================
// TYPE-STATE EVALUATION
// =============================================================================

/// A submission with compile-time enforced state.
#[derive(Debug)]
pub struct Evaluation<S> {
    tx_hash: Hash,
    sender: Address,
    nonce: u64,
    started: Instant,
    rules: Option<RefundRules>,
    _state: PhantomData<S>,
}

impl<S> Evaluation<S> {
    /// Transaction hash.
    pub fn tx_hash(&self) -> Hash {
        self.tx_hash
    }

    /// Transaction sender.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Transaction nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}

impl Evaluation<Submitted> {
    /// Entry point: a submission received by the coordinator.
    pub fn submit(tx: &SignedTransaction) -> Self {
        Self {
            tx_hash: tx.hash(),
            sender: tx.sender(),
            nonce: tx.nonce,
            started: Instant::now(),
            rules: None,
            _state: PhantomData,
        }
    }

    /// Dispatch under the refund rules of the chosen snapshot.
    pub fn begin(self, rules: RefundRules) -> Evaluation<Evaluating> {
        Evaluation {
            tx_hash: self.tx_hash,
            sender: self.sender,
            nonce: self.nonce,
            started: self.started,
            rules: Some(rules),
            _state: PhantomData,
        }
    }
}

impl Evaluation<Evaluating> {
    /// Rules this evaluation runs under.
    pub fn rules(&self) -> Option<RefundRules> {
        self.rules
    }

    /// Classify the transition result. Terminal.
    pub fn settle(self, result: Result<TransitionResult, TransitionError>) -> Settled {
        let dispatched = !matches!(
            result,
            Err(TransitionError::Validation(ValidationError::IntrinsicGasTooLow { .. }))
        );
        Settled {
            tx_hash: self.tx_hash,
            elapsed: self.started.elapsed(),
            dispatched,
            result: classify(self.tx_hash, result),
        }
    }
}

/// A verdict, or the reason there is none.
#[derive(Debug)]
pub struct Settled {
    tx_hash: Hash,
    elapsed: Duration,
    dispatched: bool,
    result: Result<PreconfOutcome, PreconfError>,
}

impl Settled {
    /// Transaction hash.
    pub fn tx_hash(&self) -> Hash {
        self.tx_hash
    }

    /// Time from submission to settlement.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the transaction reached the executor. One that cannot cover
    /// its intrinsic gas gets a `Failed` verdict without being run, and can
    /// never run in a block either.
    pub fn dispatched(&self) -> bool {
        self.dispatched
    }

    /// The outcome, if the transaction was evaluated.
    pub fn outcome(&self) -> Option<&PreconfOutcome> {
        self.result.as_ref().ok()
    }

    /// Consume into the classified result.
    pub fn into_result(self) -> Result<PreconfOutcome, PreconfError> {
        self.result
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Map a transition result onto the preconf verdict taxonomy.
///
/// | Transition | Verdict |
/// |------------|---------|
/// | success | `Confirmed` |
/// | execution failure | `Failed` with `ExecutionError::reason()` |
/// | `IntrinsicGasTooLow` | `Failed`, never dispatched |
/// | other validation error | `PreconfError::Rejected` |
/// | state error | `PreconfError::Infrastructure` |
/// | invariant violation | `PreconfError::Internal` |
pub fn classify(
    tx_hash: Hash,
    result: Result<TransitionResult, TransitionError>,
) -> Result<PreconfOutcome, PreconfError> {
    match result {
        Ok(applied) => Ok(match &applied.failure {
            None => PreconfOutcome::confirmed(tx_hash, applied.gas_used, applied.gas_charged),
            Some(failure) => PreconfOutcome::failed(
                tx_hash,
                failure.reason(),
                applied.gas_used,
                applied.gas_charged,
            ),
        }),
        Err(TransitionError::Validation(ValidationError::IntrinsicGasTooLow { have, want })) => {
            let reason = ValidationError::IntrinsicGasTooLow { have, want }.to_string();
            Ok(PreconfOutcome::failed(tx_hash, reason, want, want))
        }
        Err(TransitionError::Validation(err)) => Err(PreconfError::Rejected(err)),
        Err(TransitionError::State(err)) => Err(PreconfError::Infrastructure(err)),
        Err(TransitionError::Invariant(violation)) => Err(violation.into()),
    }
}
