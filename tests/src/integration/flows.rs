//! # Integration Test Flows
//!
//! End-to-end transfer flows through [`BridgeService`] against the
//! in-memory chain clients and recording sinks.
//!
//! ## Flows Tested
//!
//! 1. **Deposit (L1 -> L2)**: capacity pre-flight, conditional approval,
//!    submission, event confirmation
//! 2. **Withdrawal phase A (L2)**: initiate submission, status polling
//! 3. **Withdrawal phase B (L1)**: withdraw submission, event confirmation
//!
//! [`BridgeService`]: bridge_engine::BridgeService

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bridge_engine::adapters::{
        InMemoryEvmChain, InMemoryL2Chain, RecordingCompletions, RecordingProgress,
        RecordingTracker,
    };
    use bridge_engine::algorithms::{felt_from_u128, max_allowance};
    use bridge_engine::ports::inbound::TransferApi;
    use bridge_engine::ports::outbound::EvmCallArg;
    use bridge_engine::{BridgeConfig, BridgeError, BridgeService, ChainClientError};
    use bridge_types::{
        ChainAddress, ChainId, ChainLayer, DecimalAmount, DepositEvent, EthAddress, Felt, Token,
        TxHash, TxRef, WithdrawalEvent, U256,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn l1_account() -> EthAddress {
        EthAddress::new([0xAA; 20])
    }

    fn l2_account() -> Felt {
        Felt::from(0xBEEFu64)
    }

    fn usdc_contract() -> EthAddress {
        EthAddress::new([0x11; 20])
    }

    fn usdc_bridge() -> EthAddress {
        EthAddress::new([0x22; 20])
    }

    fn eth_bridge() -> EthAddress {
        EthAddress::new([0x33; 20])
    }

    fn usdc_l2_contract() -> Felt {
        Felt::from(0x1001u64)
    }

    fn usdc_l2_bridge() -> Felt {
        Felt::from(0x2002u64)
    }

    struct Harness {
        service: Arc<BridgeService>,
        evm: Arc<InMemoryEvmChain>,
        l2: Arc<InMemoryL2Chain>,
        tracker: Arc<RecordingTracker>,
        progress: Arc<RecordingProgress>,
        completions: Arc<RecordingCompletions>,
    }

    impl Harness {
        fn new() -> Self {
            let evm = Arc::new(InMemoryEvmChain::new(l1_account()));
            let l2 = Arc::new(InMemoryL2Chain::new());
            let tracker = Arc::new(RecordingTracker::new());
            let progress = Arc::new(RecordingProgress::new());
            let completions = Arc::new(RecordingCompletions::new());
            let config = BridgeConfig {
                l2_poll_interval_ms: 1,
                ..BridgeConfig::default()
            };
            let service = Arc::new(BridgeService::new(
                config,
                evm.clone(),
                l2.clone(),
                tracker.clone(),
                progress.clone(),
                completions.clone(),
                l1_account(),
                l2_account(),
            ));
            service.tokens().set_tokens(vec![
                Token::new("ETH", "Ether", 18, ChainLayer::L1)
                    .with_bridge_address(ChainId::Mainnet, ChainAddress::Evm(eth_bridge())),
                Token::new("USDC", "USD Coin", 6, ChainLayer::L1)
                    .with_bridge_address(ChainId::Mainnet, ChainAddress::Evm(usdc_bridge()))
                    .with_token_address(ChainId::Mainnet, ChainAddress::Evm(usdc_contract())),
                Token::new("USDC", "USD Coin", 6, ChainLayer::L2)
                    .with_bridge_address(ChainId::L2Mainnet, ChainAddress::L2(usdc_l2_bridge()))
                    .with_token_address(ChainId::L2Mainnet, ChainAddress::L2(usdc_l2_contract())),
            ]);
            Self {
                service,
                evm,
                l2,
                tracker,
                progress,
                completions,
            }
        }

        fn token(&self, symbol: &str, layer: ChainLayer) -> Token {
            self.service
                .tokens()
                .find_on_layer(symbol, layer)
                .map(|(_, token)| token)
                .expect("fixture token")
        }

        /// Seed USDC so a deposit of up to 900 (raw 6 decimals) fits under
        /// the cap of 1000.
        fn seed_usdc(&self) {
            self.evm.set_token_balance(
                &usdc_contract(),
                &usdc_bridge(),
                U256::from(100_000_000u64),
            );
            self.evm.set_constant(
                &usdc_bridge(),
                "maxTotalBalance",
                U256::from(1_000_000_000u64),
            );
        }

        fn seed_eth(&self) {
            self.evm
                .set_native_balance(&eth_bridge(), U256::from(10_000_000_000_000_000_000u128));
            self.evm.set_constant(
                &eth_bridge(),
                "maxTotalBalance",
                U256::from(100u128 * 10u128.pow(18)),
            );
        }

        /// Wait until the named L1 method has been submitted and return its
        /// transaction hash.
        async fn submitted_tx(&self, method: &str) -> TxHash {
            for _ in 0..500 {
                if let Some(tx) = self.evm.sent().iter().find(|tx| tx.method == method) {
                    return tx.tx_hash;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            panic!("{method} was never submitted");
        }
    }

    fn amount(text: &str) -> DecimalAmount {
        DecimalAmount::new(text).unwrap()
    }

    // =============================================================================
    // DEPOSITS
    // =============================================================================

    #[tokio::test]
    async fn test_erc20_deposit_approves_then_deposits() {
        let harness = Harness::new();
        harness.seed_usdc();
        let token = harness.token("USDC", ChainLayer::L1);

        let service = harness.service.clone();
        let task = tokio::spawn(async move { service.transfer_to_l2(&token, amount("50")).await });

        let deposit_tx = harness.submitted_tx("deposit").await;
        assert!(harness.service.deposit_listeners().deliver(DepositEvent {
            tx_hash: deposit_tx,
            sender: l1_account(),
            l2_recipient: l2_account(),
            amount: U256::from(50_000_000u64),
        }));

        let transfer = task.await.unwrap().unwrap().expect("confirmed transfer");
        assert_eq!(transfer.source_tx, Some(TxRef::Evm(deposit_tx)));
        assert_eq!(transfer.destination_tx, Some(TxRef::Evm(deposit_tx)));
        assert_eq!(transfer.amount, amount("50"));

        // Approval rides ahead of the deposit in the same session.
        assert_eq!(harness.evm.sent_methods(), vec!["approve", "deposit"]);
        let sent = harness.evm.sent();
        assert_eq!(
            sent[0].args,
            vec![
                EvmCallArg::Address(usdc_bridge()),
                EvmCallArg::Uint(max_allowance()),
            ]
        );
        assert_eq!(
            sent[1].args,
            vec![
                EvmCallArg::Uint(U256::from(50_000_000u64)),
                EvmCallArg::Uint(l2_account().to_u256()),
            ]
        );
        assert_eq!(sent[1].value, None);

        assert_eq!(harness.progress.steps(), vec![0, 1, 2, 3, 4]);
        assert_eq!(
            harness.tracker.event_names(),
            vec!["transfer_to_l2_initiated", "transfer_to_l2_success"]
        );
        assert_eq!(harness.completions.transfers().len(), 1);
    }

    #[tokio::test]
    async fn test_erc20_deposit_skips_approval_when_allowance_covers() {
        let harness = Harness::new();
        harness.seed_usdc();
        harness
            .evm
            .set_allowance(&usdc_contract(), &usdc_bridge(), max_allowance());
        let token = harness.token("USDC", ChainLayer::L1);

        let service = harness.service.clone();
        let task = tokio::spawn(async move { service.transfer_to_l2(&token, amount("50")).await });

        let deposit_tx = harness.submitted_tx("deposit").await;
        harness.service.deposit_listeners().deliver(DepositEvent {
            tx_hash: deposit_tx,
            sender: l1_account(),
            l2_recipient: l2_account(),
            amount: U256::from(50_000_000u64),
        });

        task.await.unwrap().unwrap().expect("confirmed transfer");
        assert_eq!(harness.evm.sent_methods(), vec!["deposit"]);
        // The approval step never fires; indices still only advance.
        assert_eq!(harness.progress.steps(), vec![0, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_native_deposit_attaches_call_value() {
        let harness = Harness::new();
        harness.seed_eth();
        let token = harness.token("ETH", ChainLayer::L1);

        let service = harness.service.clone();
        let task = tokio::spawn(async move { service.transfer_to_l2(&token, amount("1.5")).await });

        let deposit_tx = harness.submitted_tx("deposit").await;
        harness.service.deposit_listeners().deliver(DepositEvent {
            tx_hash: deposit_tx,
            sender: l1_account(),
            l2_recipient: l2_account(),
            amount: U256::from(1_500_000_000_000_000_000u128),
        });

        task.await.unwrap().unwrap().expect("confirmed transfer");
        let sent = harness.evm.sent();
        assert_eq!(sent.len(), 1);
        // The native asset carries no amount argument; it travels as value.
        assert_eq!(sent[0].args, vec![EvmCallArg::Uint(l2_account().to_u256())]);
        assert_eq!(
            sent[0].value,
            Some(U256::from(1_500_000_000_000_000_000u128))
        );
        assert_eq!(harness.progress.steps(), vec![0, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_deposit_over_capacity_is_rejected_before_any_send() {
        let harness = Harness::new();
        harness.seed_usdc();
        let token = harness.token("USDC", ChainLayer::L1);

        // Held 100 + requested 950 > cap 1000.
        let err = harness
            .service
            .transfer_to_l2(&token, amount("950"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::CapacityExceeded { .. }));

        assert!(harness.evm.sent().is_empty());
        assert_eq!(
            harness.tracker.event_names(),
            vec!["transfer_to_l2_rejected"]
        );
        let updates = harness.progress.updates();
        assert_eq!(updates.last().unwrap().active_step, 0);
        assert!(harness.completions.transfers().is_empty());
        // The slot is free for the next attempt.
        assert!(!harness.service.deposit_listeners().is_active());
    }

    #[tokio::test]
    async fn test_cleared_event_wait_resolves_without_transfer() {
        let harness = Harness::new();
        harness.seed_usdc();
        let token = harness.token("USDC", ChainLayer::L1);

        let service = harness.service.clone();
        let task = tokio::spawn(async move { service.transfer_to_l2(&token, amount("50")).await });

        harness.submitted_tx("deposit").await;
        harness.service.deposit_listeners().clear();

        let outcome = task.await.unwrap().unwrap();
        assert!(outcome.is_none());
        // Initiated was tracked, success never was.
        assert_eq!(
            harness.tracker.event_names(),
            vec!["transfer_to_l2_initiated"]
        );
        assert!(harness.completions.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_wallet_rejection_tracked_as_error() {
        let harness = Harness::new();
        harness.seed_usdc();
        harness
            .evm
            .set_allowance(&usdc_contract(), &usdc_bridge(), max_allowance());
        harness
            .evm
            .fail_sends(ChainClientError::WalletRejected("user denied".to_string()));
        let token = harness.token("USDC", ChainLayer::L1);

        let err = harness
            .service
            .transfer_to_l2(&token, amount("50"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Transaction { .. }));
        assert_eq!(harness.tracker.event_names()[0], "transfer_to_l2_initiated");
        assert_eq!(
            harness.tracker.event_names().last().copied(),
            Some("transfer_to_l2_error")
        );
        // The abandoned subscription was cleared.
        assert!(!harness.service.deposit_listeners().is_active());
    }

    #[tokio::test]
    async fn test_second_deposit_fails_fast_while_listener_active() {
        let harness = Harness::new();
        harness.seed_usdc();
        let token = harness.token("USDC", ChainLayer::L1);

        let _receiver = harness.service.deposit_listeners().register().unwrap();
        let err = harness
            .service
            .transfer_to_l2(&token, amount("50"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ListenerActive));
    }

    #[tokio::test]
    async fn test_rejected_second_deposit_leaves_first_wait_deliverable() {
        let harness = Harness::new();
        harness.seed_usdc();
        harness
            .evm
            .set_allowance(&usdc_contract(), &usdc_bridge(), max_allowance());
        let token = harness.token("USDC", ChainLayer::L1);

        let service = harness.service.clone();
        let first_token = token.clone();
        let first =
            tokio::spawn(async move { service.transfer_to_l2(&first_token, amount("50")).await });
        let deposit_tx = harness.submitted_tx("deposit").await;

        // The second run fails fast; the first run's registration survives.
        let err = harness
            .service
            .transfer_to_l2(&token, amount("10"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ListenerActive));
        assert!(harness.service.deposit_listeners().is_active());

        assert!(harness.service.deposit_listeners().deliver(DepositEvent {
            tx_hash: deposit_tx,
            sender: l1_account(),
            l2_recipient: l2_account(),
            amount: U256::from(50_000_000u64),
        }));
        let transfer = first.await.unwrap().unwrap().expect("confirmed transfer");
        assert_eq!(transfer.destination_tx, Some(TxRef::Evm(deposit_tx)));
    }

    // =============================================================================
    // WITHDRAWALS
    // =============================================================================

    #[tokio::test]
    async fn test_withdraw_initiate_submits_split_amount_calldata() {
        let harness = Harness::new();
        let token = harness.token("USDC", ChainLayer::L2);

        let transfer = harness
            .service
            .transfer_to_l1(&token, amount("50"))
            .await
            .unwrap();

        let executed = harness.l2.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].entrypoint, "initiate_withdraw");
        assert_eq!(executed[0].contract, usdc_l2_bridge());
        // Recipient as a felt, amount as a (low, high) uint256 pair.
        assert_eq!(
            executed[0].calldata,
            vec![
                Felt::from(l1_account()),
                felt_from_u128(50_000_000u128),
                felt_from_u128(0u128),
            ]
        );

        assert_eq!(transfer.source_tx, Some(TxRef::L2(executed[0].tx_hash)));
        assert_eq!(transfer.destination_tx, None);
        assert!(transfer.event.is_none());
        assert_eq!(harness.progress.steps(), vec![0, 1, 2]);
        assert_eq!(
            harness.tracker.event_names(),
            vec!["transfer_to_l1_initiated", "transfer_to_l1_success"]
        );
        // Phase A hands the pending transfer to the sink for later phase B.
        assert_eq!(harness.completions.transfers().len(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_initiate_surfaces_sequencer_rejection() {
        let harness = Harness::new();
        let token = harness.token("USDC", ChainLayer::L2);
        harness
            .l2
            .fail_executes(ChainClientError::Reverted("nope".to_string()));

        let err = harness
            .service
            .transfer_to_l1(&token, amount("50"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Transaction { .. }));
        assert_eq!(
            harness.tracker.event_names().last().copied(),
            Some("transfer_to_l1_error")
        );
    }

    #[tokio::test]
    async fn test_withdraw_complete_finalizes_phase_a_transfer() {
        let harness = Harness::new();
        let l2_token = harness.token("USDC", ChainLayer::L2);

        let pending = harness
            .service
            .transfer_to_l1(&l2_token, amount("50"))
            .await
            .unwrap();

        let service = harness.service.clone();
        let pending_clone = pending.clone();
        let task =
            tokio::spawn(async move { service.complete_transfer_to_l1(&pending_clone).await });

        let withdraw_tx = harness.submitted_tx("withdraw").await;
        assert!(harness
            .service
            .withdrawal_listeners()
            .deliver(WithdrawalEvent {
                tx_hash: withdraw_tx,
                recipient: l1_account(),
                amount: U256::from(50_000_000u64),
            }));

        let completed = task.await.unwrap().unwrap().expect("confirmed transfer");
        assert_eq!(completed.source_tx, pending.source_tx);
        assert_eq!(completed.destination_tx, Some(TxRef::Evm(withdraw_tx)));
        assert!(completed.event.is_some());

        let sent = harness.evm.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "withdraw");
        assert_eq!(sent[0].contract, usdc_bridge());
        assert_eq!(
            sent[0].args,
            vec![
                EvmCallArg::Uint(U256::from(50_000_000u64)),
                EvmCallArg::Address(l1_account()),
            ]
        );

        assert_eq!(
            harness.tracker.event_names(),
            vec![
                "transfer_to_l1_initiated",
                "transfer_to_l1_success",
                "complete_transfer_to_l1_initiated",
                "complete_transfer_to_l1_success",
            ]
        );
        // Phase A and phase B each produced one sink record.
        assert_eq!(harness.completions.transfers().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_second_completion_leaves_first_wait_deliverable() {
        let harness = Harness::new();
        let l2_token = harness.token("USDC", ChainLayer::L2);
        let pending = harness
            .service
            .transfer_to_l1(&l2_token, amount("50"))
            .await
            .unwrap();

        let service = harness.service.clone();
        let first_pending = pending.clone();
        let first =
            tokio::spawn(async move { service.complete_transfer_to_l1(&first_pending).await });
        let withdraw_tx = harness.submitted_tx("withdraw").await;

        let err = harness
            .service
            .complete_transfer_to_l1(&pending)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ListenerActive));
        assert!(harness.service.withdrawal_listeners().is_active());

        assert!(harness
            .service
            .withdrawal_listeners()
            .deliver(WithdrawalEvent {
                tx_hash: withdraw_tx,
                recipient: l1_account(),
                amount: U256::from(50_000_000u64),
            }));
        let completed = first.await.unwrap().unwrap().expect("confirmed transfer");
        assert_eq!(completed.destination_tx, Some(TxRef::Evm(withdraw_tx)));
    }

    #[tokio::test]
    async fn test_withdraw_complete_unknown_symbol() {
        let harness = Harness::new();
        let l2_token = harness.token("USDC", ChainLayer::L2);
        let mut pending = harness
            .service
            .transfer_to_l1(&l2_token, amount("50"))
            .await
            .unwrap();
        pending.symbol = "WBTC".to_string();

        let err = harness
            .service
            .complete_transfer_to_l1(&pending)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownToken(_)));
    }

    #[tokio::test]
    async fn test_max_deposit_read_once_per_symbol() {
        let harness = Harness::new();
        harness
            .evm
            .set_constant(&usdc_bridge(), "maxDeposit", U256::from(250_000_000u64));
        let token = harness.token("USDC", ChainLayer::L1);

        let cap = harness.service.max_deposit(&token).await.unwrap();
        assert_eq!(cap.as_str(), "250");

        // Cached for the session; a changed chain value is not observed.
        harness
            .evm
            .set_constant(&usdc_bridge(), "maxDeposit", U256::from(1_000_000u64));
        let cap = harness.service.max_deposit(&token).await.unwrap();
        assert_eq!(cap.as_str(), "250");
    }

    // =============================================================================
    // BALANCE REFRESH
    // =============================================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_refresh_balances_updates_the_token_table() {
        let harness = Harness::new();
        harness.evm.set_token_balance(
            &usdc_contract(),
            &l1_account(),
            U256::from(12_500_000u64),
        );
        harness
            .evm
            .set_native_balance(&l1_account(), U256::from(2_000_000_000_000_000_000u128));
        harness
            .l2
            .set_balance(&usdc_l2_contract(), &l2_account(), U256::from(7_000_000u64));

        harness.service.refresh_balances(None);

        for _ in 0..500 {
            tokio::time::sleep(Duration::from_millis(1)).await;
            if harness
                .service
                .tokens()
                .snapshot()
                .iter()
                .all(|t| t.balance != bridge_types::TokenBalance::Unknown && !t.is_loading)
            {
                break;
            }
        }

        let balance = |symbol: &str, layer| {
            let (_, token) = harness.service.tokens().find_on_layer(symbol, layer).unwrap();
            match token.balance {
                bridge_types::TokenBalance::Known(amount) => amount.to_string(),
                bridge_types::TokenBalance::Unknown => panic!("{symbol} balance unknown"),
            }
        };
        assert_eq!(balance("ETH", ChainLayer::L1), "2");
        assert_eq!(balance("USDC", ChainLayer::L1), "12.5");
        assert_eq!(balance("USDC", ChainLayer::L2), "7");
    }
}
