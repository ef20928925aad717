//! # Pre-Confirmation Coordinator
//!
//! Produces a synchronous verdict for a submitted transaction, then hands
//! the transaction to normal pool admission.
//!
//! ## Flow
//!
//! ```text
//! submit_with_preconf(tx)
//!   └─ sender lane (one submission per sender at a time)
//!        └─ spawned task ───────────────────────────────────────────┐
//!             assess(tx)                                           │
//!               ├─ publish TxRequest                               │
//!               ├─ pool capability / allowlist ─→ NotEvaluated     │
//!               ├─ select snapshot (selection lock)                │
//!               ├─ StateTransition::apply ─→ classify              │
//!               └─ publish TxOutcome                               │
//!             admit(tx) unless rejected or never runnable          │
//!             record status (members only)                         │
//!   └─ wait up to config.timeout ◄─────────────────────────────────┘
//! ```
//!
//! The task is detached: a caller that stops waiting does not cancel the
//! evaluation, and subscribers still receive its verdict.
//!
//! A Confirmed verdict is advisory. The transaction can still fail in a
//! block built under different conditions.

use crate::config::PreconfConfig;
use crate::domain::evaluation::{Evaluation, Submitted};
use crate::errors::PreconfError;
use crate::ports::outbound::SnapshotSource;
use qc_06_mempool::{PoolAdmission, PoolSet, PreconfCapability, TxPool};
use qc_11_state_transition::ports::outbound::EvmExecutor;
use qc_11_state_transition::processor::StateTransition;
use quantum_telemetry::{
    metric_inc, metric_observe, PRECONF_EVALUATION_DURATION, PRECONF_OUTCOMES,
    PRECONF_REFUND_GAS, PRECONF_REJECTIONS,
};
use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus, PreconfEvent, Subscription};
use shared_types::entities::{address_hex, hash_hex, Address, Hash, SignedTransaction};
use shared_types::{ForkOracle, PreconfOutcome, PreconfVerdict};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, error, info, instrument, warn};

/// Statistics for the coordinator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Verdicts produced (Confirmed + Failed).
    pub evaluated: u64,
    /// Confirmed verdicts.
    pub confirmed: u64,
    /// Failed verdicts.
    pub failed: u64,
    /// Submissions answered with the "not evaluated" sentinel.
    pub not_evaluated: u64,
    /// Submissions rejected at validation.
    pub rejected: u64,
    /// Submissions that could not be evaluated (snapshot, executor, bugs).
    pub infrastructure_errors: u64,
    /// Admission failures after the verdict.
    pub admission_errors: u64,
    /// Callers that stopped waiting before the verdict.
    pub timeouts: u64,
}

type Lane = Arc<Mutex<()>>;

/// A verdict and whether its transaction may enter a pool.
struct Assessment {
    verdict: PreconfVerdict,
    /// False when the transaction can never run (intrinsic gas not covered).
    admissible: bool,
}

impl Assessment {
    fn with_verdict(verdict: PreconfVerdict) -> Self {
        Self {
            verdict,
            admissible: true,
        }
    }
}

fn record_status(pool: &TxPool, verdict: &PreconfVerdict) {
    if let Some(outcome) = verdict.outcome() {
        pool.set_preconf_status(outcome.tx_hash(), outcome.status());
    }
}

/// The pre-confirmation coordinator.
pub struct PreconfCoordinator {
    config: PreconfConfig,
    pools: PoolSet,
    snapshots: Arc<dyn SnapshotSource>,
    transition: StateTransition,
    chain: Arc<dyn ForkOracle>,
    bus: Arc<InMemoryEventBus>,
    /// Serializes snapshot selection.
    selection: Mutex<()>,
    /// Per-sender submission lanes.
    lanes: parking_lot::Mutex<HashMap<Address, Lane>>,
    stats: RwLock<CoordinatorStats>,
}

impl PreconfCoordinator {
    /// Create a new coordinator.
    pub fn new(
        config: PreconfConfig,
        pools: PoolSet,
        snapshots: Arc<dyn SnapshotSource>,
        executor: Arc<dyn EvmExecutor>,
        chain: Arc<dyn ForkOracle>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            config,
            pools,
            snapshots,
            transition: StateTransition::new(executor),
            chain,
            bus,
            selection: Mutex::new(()),
            lanes: parking_lot::Mutex::new(HashMap::new()),
            stats: RwLock::new(CoordinatorStats::default()),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PreconfConfig {
        &self.config
    }

    /// The pools this coordinator admits into.
    pub fn pools(&self) -> &PoolSet {
        &self.pools
    }

    /// Get current statistics.
    pub async fn stats(&self) -> CoordinatorStats {
        self.stats.read().await.clone()
    }

    /// Subscribe to request notices and verdicts.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Confirmed-preconf transactions for the block builder.
    pub fn pending_preconf_txs(&self) -> Vec<SignedTransaction> {
        self.pools.pending_preconf_txs()
    }

    /// Evaluate `tx` against the current pending snapshot.
    ///
    /// Does not admit the transaction. Publishes at most one outcome event.
    /// The verdict is recorded in the pool only if `tx` is already a member.
    pub async fn evaluate(&self, tx: &SignedTransaction) -> Result<PreconfVerdict, PreconfError> {
        let assessment = self.assess(tx).await?;
        record_status(&self.pools.route(tx), &assessment.verdict);
        Ok(assessment.verdict)
    }

    #[instrument(skip_all, fields(tx_hash = %hash_hex(&tx.hash()), sender = %address_hex(&tx.from), nonce = tx.nonce))]
    async fn assess(&self, tx: &SignedTransaction) -> Result<Assessment, PreconfError> {
        let submitted = Evaluation::submit(tx);
        let tx_hash = submitted.tx_hash();
        let pool = self.pools.route(tx);

        if pool.supports_preconf() && !pool.preconf_ready() {
            self.record_error(&PreconfError::NotReady).await;
            return Err(PreconfError::NotReady);
        }

        self.bus
            .publish(PreconfEvent::TxRequest {
                tx_hash,
                from: submitted.sender(),
                nonce: submitted.nonce(),
            })
            .await;

        if !self.config.allows(tx) {
            debug!("Destination not eligible for preconf");
            return Ok(Assessment::with_verdict(self.not_evaluated(tx_hash).await));
        }

        let handled = pool
            .evaluate_preconf(move || self.run(submitted, tx))
            .await;

        let (outcome, dispatched) = match handled {
            Ok(Some(settled)) => settled,
            Ok(None) => {
                debug!(pool = pool.kind(), "Pool declines preconf");
                return Ok(Assessment::with_verdict(self.not_evaluated(tx_hash).await));
            }
            Err(err) => {
                self.record_error(&err).await;
                return Err(err);
            }
        };

        info!(
            status = outcome.status().as_str(),
            reason = outcome.reason(),
            gas_used = outcome.gas_used(),
            "Preconf verdict"
        );
        self.bus.publish(PreconfEvent::TxOutcome(outcome.clone())).await;
        self.record_outcome(&outcome).await;

        Ok(Assessment {
            verdict: PreconfVerdict::Evaluated(outcome),
            admissible: dispatched,
        })
    }

    /// Evaluate `tx`, then hand it to normal admission.
    ///
    /// Submissions from one sender are processed one at a time. Waits at most `config.timeout` for the verdict; on timeout the
    /// evaluation and admission still run to completion.
    pub async fn submit_with_preconf(
        self: &Arc<Self>,
        tx: SignedTransaction,
    ) -> Result<PreconfVerdict, PreconfError> {
        let tx_hash = tx.hash();
        let lane = self.lane(tx.from);
        let this = Arc::clone(self);

        let task = tokio::spawn(async move {
            let turn = lane.lock_owned().await;
            this.process(tx, turn).await
        });

        match tokio::time::timeout(self.config.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                error!(tx_hash = %hash_hex(&tx_hash), error = %join_error, "Preconf task failed");
                let err = PreconfError::Internal(join_error.to_string());
                self.record_error(&err).await;
                Err(err)
            }
            Err(_) => {
                warn!(
                    tx_hash = %hash_hex(&tx_hash),
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Preconf wait elapsed"
                );
                let err = PreconfError::Timeout { tx_hash };
                self.record_error(&err).await;
                Err(err)
            }
        }
    }

    async fn process(
        self: Arc<Self>,
        tx: SignedTransaction,
        turn: OwnedMutexGuard<()>,
    ) -> Result<PreconfVerdict, PreconfError> {
        let sender = tx.from;

        let result = match self.assess(&tx).await {
            Err(err @ PreconfError::Rejected(_)) => Err(err),
            Ok(Assessment {
                verdict,
                admissible: false,
            }) => {
                debug!(tx_hash = %hash_hex(&tx.hash()), "Transaction can never run, not admitted");
                Ok(verdict)
            }
            Ok(assessment) => self.admit(tx, Ok(assessment.verdict)).await,
            Err(err) => self.admit(tx, Err(err)).await,
        };

        drop(turn);
        self.release_lane(&sender);
        result
    }

    /// Normal admission after the verdict. The status is recorded afterwards
    /// so that only members carry one.
    async fn admit(
        &self,
        tx: SignedTransaction,
        verdict: Result<PreconfVerdict, PreconfError>,
    ) -> Result<PreconfVerdict, PreconfError> {
        let tx_hash = tx.hash();
        let pool = self.pools.route(&tx);
        let admitted = pool.admit(tx).await;
        if let Ok(verdict) = &verdict {
            record_status(&pool, verdict);
        }

        match (admitted, verdict) {
            (Ok(()), verdict) => verdict,
            (Err(admission), Ok(PreconfVerdict::NotEvaluated { .. })) => {
                let err = PreconfError::from(admission);
                self.record_error(&err).await;
                Err(err)
            }
            (Err(admission), verdict) => {
                warn!(tx_hash = %hash_hex(&tx_hash), error = %admission, "Admission failed after preconf");
                self.stats.write().await.admission_errors += 1;
                metric_inc!(PRECONF_REJECTIONS, &["admission"]);
                verdict
            }
        }
    }

    async fn run(
        &self,
        submitted: Evaluation<Submitted>,
        tx: &SignedTransaction,
    ) -> Result<(PreconfOutcome, bool), PreconfError> {
        let snapshot = {
            let _selecting = self.selection.lock().await;
            self.snapshots.pending_snapshot().await?
        };

        let rules = self.chain.refund_rules(snapshot.block().timestamp);
        debug!(
            block = snapshot.block().number,
            post_fork = rules.post_fork_active,
            "Snapshot selected"
        );

        let evaluating = submitted.begin(rules);
        let result = self.transition.apply(snapshot.as_ref(), tx, rules).await;
        let settled = evaluating.settle(result);

        metric_observe!(PRECONF_EVALUATION_DURATION, settled.elapsed().as_secs_f64());
        let dispatched = settled.dispatched();
        settled.into_result().map(|outcome| (outcome, dispatched))
    }

    async fn not_evaluated(&self, tx_hash: Hash) -> PreconfVerdict {
        self.stats.write().await.not_evaluated += 1;
        metric_inc!(PRECONF_OUTCOMES, &["not_evaluated"]);
        PreconfVerdict::NotEvaluated { tx_hash }
    }

    async fn record_outcome(&self, outcome: &PreconfOutcome) {
        let mut stats = self.stats.write().await;
        stats.evaluated += 1;
        if outcome.is_confirmed() {
            stats.confirmed += 1;
        } else {
            stats.failed += 1;
        }
        drop(stats);

        metric_inc!(PRECONF_OUTCOMES, &[outcome.status().as_str()]);
        let refund = outcome.gas_used().saturating_sub(outcome.gas_charged());
        PRECONF_REFUND_GAS.inc_by(refund as f64);
    }

    async fn record_error(&self, err: &PreconfError) {
        match err {
            PreconfError::Internal(_) => error!(error = %err, "Preconf invariant violated"),
            PreconfError::Infrastructure(_) => warn!(error = %err, "Preconf evaluation unavailable"),
            _ => debug!(error = %err, "Preconf without verdict"),
        }

        let mut stats = self.stats.write().await;
        match err {
            PreconfError::Rejected(_) => stats.rejected += 1,
            PreconfError::Infrastructure(_) | PreconfError::Internal(_) => {
                stats.infrastructure_errors += 1;
            }
            PreconfError::Timeout { .. } => stats.timeouts += 1,
            PreconfError::Admission(_) => stats.admission_errors += 1,
            PreconfError::NotReady => {}
        }
        drop(stats);

        metric_inc!(PRECONF_REJECTIONS, &[err.kind()]);
    }

    fn lane(&self, sender: Address) -> Lane {
        Arc::clone(self.lanes.lock().entry(sender).or_default())
    }

    fn release_lane(&self, sender: &Address) {
        let mut lanes = self.lanes.lock();
        if lanes.get(sender).is_some_and(|lane| Arc::strong_count(lane) == 1) {
            lanes.remove(sender);
        }
    }

    #[cfg(test)]
    fn lane_count(&self) -> usize {
        self.lanes.lock().len()
    }
}
