//! # State Transition Processor
//!
//! Applies one transaction to a snapshot:
//!
//! 1. `pre_check`: block gas limit, nonce, sender code, upfront cost,
//!    intrinsic gas. Failures never reach the executor.
//! 2. Dispatch to the [`EvmExecutor`] with `gas_limit - intrinsic` gas.
//! 3. Finalize `gas_used`, the refund under the supplied [`RefundRules`] and
//!    the gas charged.
//!
//! Nothing is written: the executor runs against the read-only snapshot and
//! only its counters are consumed here.

use crate::domain::entities::{ExecutionOutput, TransitionResult};
use crate::domain::intrinsic::intrinsic_gas;
use crate::domain::refund::{calc_refund, GasCounters};
use crate::errors::{InvariantViolation, TransitionError, ValidationError};
use crate::ports::outbound::{EvmExecutor, StateSnapshot};
use shared_types::chain::RefundRules;
use shared_types::entities::{address_hex, hash_hex, SignedTransaction, U256};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Executes single transactions against snapshots.
#[derive(Clone)]
pub struct StateTransition {
    executor: Arc<dyn EvmExecutor>,
}

impl StateTransition {
    /// Create a processor backed by `executor`.
    pub fn new(executor: Arc<dyn EvmExecutor>) -> Self {
        Self { executor }
    }

    /// Apply `tx` to `snapshot` and finalize its gas.
    #[instrument(
        skip_all,
        fields(
            tx_hash = %hash_hex(&tx.hash()),
            sender = %address_hex(&tx.from),
            nonce = tx.nonce,
            post_fork = rules.post_fork_active,
        )
    )]
    pub async fn apply(
        &self,
        snapshot: &dyn StateSnapshot,
        tx: &SignedTransaction,
        rules: RefundRules,
    ) -> Result<TransitionResult, TransitionError> {
        let intrinsic = self.pre_check(snapshot, tx).await?;
        let gas_available = tx.gas_limit - intrinsic;

        debug!(intrinsic, gas_available, "Dispatching to executor");
        let output = self.executor.execute(snapshot, tx, gas_available).await?;

        let result = Self::finalize(tx, intrinsic, gas_available, output, rules)?;
        debug!(
            gas_used = result.gas_used,
            refund = result.refund,
            gas_charged = result.gas_charged,
            failed = !result.succeeded(),
            "Transition finalized"
        );
        Ok(result)
    }

    /// Validate `tx` against `snapshot`. Returns the intrinsic gas on success.
    pub async fn pre_check(
        &self,
        snapshot: &dyn StateSnapshot,
        tx: &SignedTransaction,
    ) -> Result<u64, TransitionError> {
        let block_limit = snapshot.block().gas_limit;
        if tx.gas_limit > block_limit {
            return Err(ValidationError::GasLimitExceedsBlock {
                limit: tx.gas_limit,
                block_limit,
            }
            .into());
        }

        let account = snapshot.account(&tx.from).await?;

        match tx.nonce.cmp(&account.nonce) {
            Ordering::Less => {
                return Err(ValidationError::NonceTooLow {
                    address: tx.from,
                    expected: account.nonce,
                    actual: tx.nonce,
                }
                .into())
            }
            Ordering::Greater => {
                return Err(ValidationError::NonceTooHigh {
                    address: tx.from,
                    expected: account.nonce,
                    actual: tx.nonce,
                }
                .into())
            }
            Ordering::Equal => {}
        }

        if account.has_code() {
            return Err(ValidationError::SenderNotEoa { address: tx.from }.into());
        }

        let want = tx.upfront_cost().unwrap_or(U256::MAX);
        if account.balance < want {
            return Err(ValidationError::InsufficientFunds {
                address: tx.from,
                have: account.balance,
                want,
            }
            .into());
        }

        let intrinsic = intrinsic_gas(tx);
        if tx.gas_limit < intrinsic {
            return Err(ValidationError::IntrinsicGasTooLow {
                have: tx.gas_limit,
                want: intrinsic,
            }
            .into());
        }

        Ok(intrinsic)
    }

    fn finalize(
        tx: &SignedTransaction,
        intrinsic: u64,
        gas_available: u64,
        output: ExecutionOutput,
        rules: RefundRules,
    ) -> Result<TransitionResult, TransitionError> {
        if output.gas_remaining > gas_available {
            return Err(InvariantViolation::GasRemainingExceedsInitial {
                initial: gas_available,
                remaining: output.gas_remaining,
            }
            .into());
        }

        let counters = GasCounters::new(tx.gas_limit, output.gas_remaining, output.refund_counter)?;
        let gas_used = counters.gas_used();
        let refund = calc_refund(&counters, rules);

        Ok(TransitionResult {
            intrinsic_gas: intrinsic,
            gas_used,
            refund,
            gas_charged: gas_used.saturating_sub(refund),
            failure: output.error,
            return_data: output.return_data,
        })
    }
}
