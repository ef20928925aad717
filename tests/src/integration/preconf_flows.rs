//! # Preconfirmation Flows
//!
//! End-to-end submissions through the coordinator, the pools, the state
//! transition and the event bus, with a token contract as the executor.

#[cfg(test)]
mod tests {
    use crate::integration::token::{
        encode_transfer, encode_transfer_from, Ledger, TokenExecutor, ALLOWANCE_INSUFFICIENT,
        CLEAR_SLOT_REFUND, UNDERFLOW_BALANCE_SENDER,
    };
    use qc_06_mempool::{BlobPool, LegacyPool, PoolConfig, PoolSet};
    use qc_11_state_transition::adapters::InMemorySnapshot;
    use qc_11_state_transition::errors::reasons;
    use qc_18_preconfirmation::adapters::SharedSnapshotSource;
    use qc_18_preconfirmation::{PreconfConfig, PreconfCoordinator, PreconfError};
    use shared_bus::{EventFilter, InMemoryEventBus, PreconfEvent};
    use shared_types::{
        AccountState, Address, BlobPayload, BlockContext, ChainSpec, ForkOracle, PreconfStatus,
        PreconfVerdict, SignedTransaction, TokenRatio, U256,
    };
    use std::sync::Arc;
    use std::time::Duration;

    const ALICE: Address = [0xA1; 20];
    const BOB: Address = [0xB0; 20];
    const CAROL: Address = [0xCA; 20];
    const TOKEN: Address = [0x70; 20];
    const FORK_TIME: u64 = 1_700_000_000;

    fn eth(amount: u64) -> U256 {
        U256::from(amount) * U256::from(1_000_000_000u64)
    }

    fn tx(from: Address, nonce: u64, data: Vec<u8>) -> SignedTransaction {
        SignedTransaction {
            from,
            to: Some(TOKEN),
            nonce,
            gas_limit: 100_000,
            gas_price: U256::one(),
            value: U256::zero(),
            data,
            blob: None,
            signature: [0u8; 64],
        }
    }

    fn snapshot_at(number: u64, timestamp: u64, funded: &[Address]) -> InMemorySnapshot {
        let snapshot = InMemorySnapshot::new(BlockContext {
            number,
            timestamp,
            ..BlockContext::default()
        });
        for address in funded {
            snapshot.set_account(*address, AccountState::new_eoa(eth(10), 0));
        }
        snapshot
    }

    struct Node {
        coordinator: Arc<PreconfCoordinator>,
        token: Arc<TokenExecutor>,
        source: Arc<SharedSnapshotSource>,
        bus: Arc<InMemoryEventBus>,
    }

    fn node_with(
        chain: impl ForkOracle + 'static,
        bus: InMemoryEventBus,
        snapshot: InMemorySnapshot,
    ) -> Node {
        let token = Arc::new(TokenExecutor::new(TOKEN));
        let source = Arc::new(SharedSnapshotSource::new(Arc::new(snapshot)));
        let pools = PoolSet::new(LegacyPool::new(PoolConfig::default()), BlobPool::with_defaults());
        pools.legacy().mark_preconf_ready();
        let bus = Arc::new(bus);

        let coordinator = Arc::new(PreconfCoordinator::new(
            PreconfConfig::default(),
            pools,
            source.clone(),
            token.clone(),
            Arc::new(chain),
            bus.clone(),
        ));
        Node {
            coordinator,
            token,
            source,
            bus,
        }
    }

    fn node() -> Node {
        let node = node_with(
            ChainSpec::without_fork(1),
            InMemoryEventBus::new(),
            snapshot_at(1, 0, &[ALICE, BOB]),
        );
        node.token.set_ledger(
            1,
            Ledger::default()
                .with_balance(ALICE, U256::from(1_000u64))
                .with_allowance(ALICE, BOB, U256::from(100u64)),
        );
        node
    }

    async fn next_outcome(subscription: &mut shared_bus::Subscription) -> PreconfEvent {
        tokio::time::timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("outcome within a second")
            .expect("bus open")
    }

    #[tokio::test]
    async fn test_token_transfer_is_confirmed() {
        let n = node();
        let mut outcomes = n.coordinator.subscribe(EventFilter::outcomes());
        let transfer = tx(ALICE, 0, encode_transfer(&CAROL, U256::from(10u64)));

        let verdict = n.coordinator.submit_with_preconf(transfer.clone()).await.unwrap();
        let outcome = verdict.outcome().unwrap();
        assert_eq!(outcome.status(), PreconfStatus::Confirmed);
        assert_eq!(outcome.reason(), "");
        assert!(outcome.gas_used() > 21_000);

        let event = next_outcome(&mut outcomes).await;
        assert_eq!(event, PreconfEvent::TxOutcome(outcome.clone()));
        assert_eq!(n.coordinator.pending_preconf_txs(), vec![transfer]);
    }

    #[tokio::test]
    async fn test_underflowing_transfer_fails_with_contract_reason() {
        let n = node();
        let transfer = tx(BOB, 0, encode_transfer(&CAROL, U256::from(1u64)));

        let verdict = n.coordinator.submit_with_preconf(transfer.clone()).await.unwrap();
        let outcome = verdict.outcome().unwrap();
        assert_eq!(outcome.status(), PreconfStatus::Failed);
        assert!(outcome.reason().contains(UNDERFLOW_BALANCE_SENDER));
        assert!(outcome.reason().starts_with(reasons::EXECUTION_REVERTED));

        // Failed verdicts still enter the pool, just not the preconf set.
        assert!(n.coordinator.pools().legacy().contains(&transfer.hash()));
        assert!(n.coordinator.pending_preconf_txs().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_from_over_allowance_fails() {
        let n = node();
        let spend = tx(BOB, 0, encode_transfer_from(&ALICE, &CAROL, U256::from(101u64)));

        let verdict = n.coordinator.submit_with_preconf(spend).await.unwrap();
        let outcome = verdict.outcome().unwrap();
        assert_eq!(outcome.status(), PreconfStatus::Failed);
        assert!(outcome.reason().contains(ALLOWANCE_INSUFFICIENT));

        let within = tx(BOB, 0, encode_transfer_from(&ALICE, &CAROL, U256::from(100u64)));
        let verdict = n.coordinator.evaluate(&within).await.unwrap();
        assert!(verdict.outcome().unwrap().is_confirmed());
    }

    #[tokio::test]
    async fn test_verdict_follows_selected_snapshot() {
        let n = node();
        let transfer = tx(ALICE, 0, encode_transfer(&CAROL, U256::from(1_000u64)));

        let before = n.coordinator.evaluate(&transfer).await.unwrap();
        assert!(before.outcome().unwrap().is_confirmed());

        // Alice spent her tokens in block 2.
        n.token.set_ledger(2, Ledger::default());
        n.source.advance(Arc::new(snapshot_at(2, 12, &[ALICE, BOB])));

        let after = n.coordinator.evaluate(&transfer).await.unwrap();
        let outcome = after.outcome().unwrap();
        assert_eq!(outcome.status(), PreconfStatus::Failed);
        assert!(outcome.reason().contains(UNDERFLOW_BALANCE_SENDER));
        assert_eq!(n.token.calls(), 2);
    }

    #[tokio::test]
    async fn test_blob_transaction_gets_sentinel_without_outcome() {
        let n = node();
        let mut all = n.coordinator.subscribe(EventFilter::all());
        let mut blob = tx(ALICE, 0, vec![]);
        blob.blob = Some(BlobPayload {
            versioned_hashes: vec![[0x01; 32]],
            blob_fee_cap: U256::one(),
        });

        let verdict = n.coordinator.submit_with_preconf(blob.clone()).await.unwrap();
        assert_eq!(verdict, PreconfVerdict::NotEvaluated { tx_hash: blob.hash() });
        assert_eq!(n.token.calls(), 0);

        assert!(matches!(all.try_recv(), Ok(Some(PreconfEvent::TxRequest { .. }))));
        assert!(matches!(all.try_recv(), Ok(None)));
        assert!(n.coordinator.pools().blob().contains(&blob.hash()));
    }

    #[tokio::test]
    async fn test_gas_below_intrinsic_fails_without_dispatch() {
        let n = node();
        let mut starved = tx(ALICE, 0, encode_transfer(&CAROL, U256::one()));
        starved.gas_limit = 1;

        let verdict = n.coordinator.submit_with_preconf(starved).await.unwrap();
        let outcome = verdict.outcome().unwrap();
        assert_eq!(outcome.status(), PreconfStatus::Failed);
        assert!(outcome.reason().starts_with(reasons::INTRINSIC_GAS_TOO_LOW));
        assert_eq!(n.token.calls(), 0);
    }

    #[tokio::test]
    async fn test_unaffordable_value_is_rejected_without_outcome() {
        let n = node();
        let mut outcomes = n.coordinator.subscribe(EventFilter::outcomes());
        let mut rich = tx(ALICE, 0, vec![]);
        rich.value = eth(11);

        let err = n.coordinator.submit_with_preconf(rich.clone()).await.unwrap_err();
        assert!(matches!(err, PreconfError::Rejected(_)));
        assert!(err.to_string().contains(reasons::INSUFFICIENT_FUNDS));

        assert!(matches!(outcomes.try_recv(), Ok(None)));
        assert!(!n.coordinator.pools().legacy().contains(&rich.hash()));
        assert_eq!(n.token.calls(), 0);
    }

    #[tokio::test]
    async fn test_post_fork_ratio_suppresses_refund() {
        let chain = ChainSpec::with_fork(1, FORK_TIME, TokenRatio::new(4_000).unwrap());
        let n = node_with(
            chain,
            InMemoryEventBus::new(),
            snapshot_at(1, FORK_TIME - 1, &[ALICE]),
        );
        for block in [1, 2] {
            n.token
                .set_ledger(block, Ledger::default().with_balance(ALICE, U256::from(50u64)));
        }
        let transfer = tx(ALICE, 0, encode_transfer(&CAROL, U256::from(50u64)));

        let pre = n.coordinator.evaluate(&transfer).await.unwrap();
        let pre = pre.outcome().unwrap().clone();
        assert!(pre.is_confirmed());
        assert_eq!(pre.gas_charged(), pre.gas_used() - CLEAR_SLOT_REFUND);

        n.source.advance(Arc::new(snapshot_at(2, FORK_TIME, &[ALICE])));
        let post = n.coordinator.evaluate(&transfer).await.unwrap();
        let post = post.outcome().unwrap().clone();

        // 100_000 / 4_000 is below the gas remaining, so the cap is zero.
        assert_eq!(post.gas_used(), pre.gas_used());
        assert_eq!(post.gas_charged(), post.gas_used());
        assert!(post.gas_charged() > pre.gas_charged());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_subscriber_does_not_block_concurrent_senders() {
        let senders: Vec<Address> = (1..=32u8).map(|byte| [byte; 20]).collect();
        let n = node_with(
            ChainSpec::without_fork(1),
            InMemoryEventBus::with_capacity(4),
            snapshot_at(1, 0, &senders),
        );
        let ledger = senders
            .iter()
            .fold(Ledger::default(), |ledger, sender| ledger.with_balance(*sender, U256::from(5u64)));
        n.token.set_ledger(1, ledger);

        // Never drained while the submissions run.
        let mut slow = n.coordinator.subscribe(EventFilter::all());

        let mut handles = Vec::new();
        for sender in &senders {
            let coordinator = Arc::clone(&n.coordinator);
            let transfer = tx(*sender, 0, encode_transfer(&CAROL, U256::one()));
            handles.push(tokio::spawn(async move {
                coordinator.submit_with_preconf(transfer).await
            }));
        }
        for handle in handles {
            let verdict = handle.await.unwrap().unwrap();
            assert!(verdict.outcome().unwrap().is_confirmed());
        }

        let stats = n.coordinator.stats().await;
        assert_eq!(stats.confirmed, 32);
        assert_eq!(stats.timeouts, 0);
        assert_eq!(n.coordinator.pools().legacy().len(), 32);

        // The slow subscriber kept only the most recent events.
        let mut delivered = 0;
        while let Ok(Some(_)) = slow.try_recv() {
            delivered += 1;
        }
        assert!(delivered <= n.bus.capacity());
    }

    #[tokio::test]
    async fn test_unsubscribed_handle_receives_nothing() {
        let n = node();
        let kept = n.coordinator.subscribe(EventFilter::outcomes());
        let dropped = n.coordinator.subscribe(EventFilter::outcomes());
        assert_eq!(n.bus.subscriber_count(), 2);

        dropped.unsubscribe();
        assert_eq!(n.bus.subscriber_count(), 1);
        assert_eq!(n.bus.active_subscriptions(), 1);

        let mut kept = kept;
        n.coordinator
            .evaluate(&tx(ALICE, 0, encode_transfer(&CAROL, U256::one())))
            .await
            .unwrap();
        assert!(matches!(kept.try_recv(), Ok(Some(PreconfEvent::TxOutcome(_)))));
    }

    #[tokio::test]
    async fn test_outcome_wire_format() {
        let n = node();
        let failing = tx(BOB, 0, encode_transfer(&CAROL, U256::one()));
        let verdict = n.coordinator.evaluate(&failing).await.unwrap();

        let json = serde_json::to_value(verdict.outcome().unwrap()).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json["reason"]
            .as_str()
            .unwrap()
            .contains(UNDERFLOW_BALANCE_SENDER));
        let hash = json["txHash"].as_str().unwrap();
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66);
        assert!(json["gasUsed"].as_u64().unwrap() >= json["gasCharged"].as_u64().unwrap());

        let passing = tx(ALICE, 0, encode_transfer(&CAROL, U256::one()));
        let verdict = n.coordinator.evaluate(&passing).await.unwrap();
        let json = serde_json::to_value(verdict.outcome().unwrap()).unwrap();
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["reason"], "");
    }

    #[tokio::test]
    async fn test_underfunded_gas_does_not_block_the_nonce() {
        let n = node();
        let mut starved = tx(ALICE, 0, encode_transfer(&CAROL, U256::from(10u64)));
        starved.gas_limit = 1;

        let verdict = n.coordinator.submit_with_preconf(starved.clone()).await.unwrap();
        let outcome = verdict.outcome().unwrap();
        assert_eq!(outcome.status(), PreconfStatus::Failed);
        assert!(outcome.reason().contains(reasons::INTRINSIC_GAS_TOO_LOW));
        assert!(!n.coordinator.pools().legacy().contains(&starved.hash()));

        // A resubmission at the same nonce is admitted and reaches the builder.
        let transfer = tx(ALICE, 0, encode_transfer(&CAROL, U256::from(10u64)));
        let verdict = n.coordinator.submit_with_preconf(transfer.clone()).await.unwrap();
        assert!(verdict.outcome().unwrap().is_confirmed());
        assert_eq!(n.coordinator.pending_preconf_txs(), vec![transfer]);
        assert_eq!(n.coordinator.stats().await.admission_errors, 0);
    }
}
