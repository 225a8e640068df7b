//! # Withdrawal Orchestration
//!
//! The two-phase L2 -> L1 flow. Phase A runs on L2: submit
//! `initiate_withdraw` and poll until the sequencer reports the
//! transaction received. Phase B runs on L1, possibly much later: submit
//! `withdraw` and wait for the bridge's confirming `Withdrawal` event.

use super::BridgeService;
use crate::algorithms::units::{felt_from_u128, to_chain_units, to_uint256_parts};
use crate::domain::{BridgeError, BridgeResult, TrackingEvent, TransferFlow};
use crate::ports::outbound::{EvmCallArg, TxOptions};
use crate::progress::ProgressReporter;
use bridge_types::{
    BridgeEvent, ChainAddress, ChainLayer, DecimalAmount, Felt, L2TransactionStatus, Token,
    Transfer, TransferDirection, TxRef,
};
use tracing::{info, warn};

impl BridgeService {
    pub(super) async fn run_initiate_withdraw(
        &self,
        token: &Token,
        amount: DecimalAmount,
    ) -> BridgeResult<Transfer> {
        info!(symbol = %token.symbol, %amount, "withdrawal initiation requested");
        let reporter =
            ProgressReporter::new(TransferFlow::WithdrawInitiate, self.progress.clone());

        match self.initiate_inner(token, &amount, &reporter).await {
            Ok(transfer) => Ok(transfer),
            Err(error) => {
                warn!(symbol = %token.symbol, %error, "withdrawal initiation failed");
                self.tracker.track(TrackingEvent::TransferToL1Error {
                    reason: error.to_string(),
                });
                reporter.error(&error);
                Err(error)
            }
        }
    }

    async fn initiate_inner(
        &self,
        token: &Token,
        amount: &DecimalAmount,
        reporter: &ProgressReporter,
    ) -> BridgeResult<Transfer> {
        let bridge = self.bridge_address(token, self.config.l2_chain)?;
        let amount_units = to_chain_units(amount, token.decimals)?;

        reporter.wait_for_confirm(&self.config.l2_network_name);
        self.tracker.track(TrackingEvent::TransferToL1Initiated {
            sender: ChainAddress::L2(self.l2_account),
            recipient: ChainAddress::Evm(self.l1_account),
            amount: amount.clone(),
            symbol: token.symbol.clone(),
        });

        let (low, high) = to_uint256_parts(amount_units);
        let calldata = vec![
            Felt::from(self.l1_account),
            felt_from_u128(low),
            felt_from_u128(high),
        ];
        let tx_hash = self
            .transactions
            .execute(&bridge, "initiate_withdraw", calldata)
            .await?;
        reporter.initiate_withdraw_sent(amount.as_str(), &token.symbol);

        reporter.await_l2_receipt();
        self.transactions
            .wait_for_status("initiate_withdraw", &tx_hash, L2TransactionStatus::Received)
            .await?;

        self.tracker.track(TrackingEvent::TransferToL1Success {
            tx: TxRef::L2(tx_hash),
        });
        let transfer = Transfer {
            direction: TransferDirection::L2ToL1,
            sender: ChainAddress::L2(self.l2_account),
            recipient: ChainAddress::Evm(self.l1_account),
            symbol: token.symbol.clone(),
            display_name: token.display_name.clone(),
            amount: amount.clone(),
            source_tx: Some(TxRef::L2(tx_hash)),
            destination_tx: None,
            event: None,
        };
        info!(symbol = %token.symbol, %amount, "withdrawal initiated, pending completion on L1");
        self.completions.transfer_completed(transfer.clone());
        Ok(transfer)
    }

    pub(super) async fn run_complete_withdraw(
        &self,
        transfer: &Transfer,
    ) -> BridgeResult<Option<Transfer>> {
        info!(symbol = %transfer.symbol, amount = %transfer.amount, "withdrawal completion requested");
        let reporter =
            ProgressReporter::new(TransferFlow::WithdrawComplete, self.progress.clone());

        match self.complete_inner(transfer, &reporter).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                // ListenerActive means the slot belongs to another run;
                // only this run's own registration is torn down.
                if !matches!(error, BridgeError::ListenerActive) {
                    self.withdrawal_listeners.clear();
                }
                warn!(symbol = %transfer.symbol, %error, "withdrawal completion failed");
                self.tracker
                    .track(TrackingEvent::CompleteTransferToL1Error {
                        reason: error.to_string(),
                    });
                reporter.error(&error);
                Err(error)
            }
        }
    }

    async fn complete_inner(
        &self,
        transfer: &Transfer,
        reporter: &ProgressReporter,
    ) -> BridgeResult<Option<Transfer>> {
        // Phase B may run in a fresh session; the transfer record carries
        // only the symbol, so the token is looked up again.
        let (_, token) = self
            .tokens
            .find_on_layer(&transfer.symbol, ChainLayer::L1)
            .ok_or_else(|| BridgeError::UnknownToken(transfer.symbol.clone()))?;
        let bridge = self.bridge_address(&token, self.config.l1_chain)?;
        let amount_units = to_chain_units(&transfer.amount, token.decimals)?;
        let recipient = transfer
            .recipient
            .as_evm()
            .copied()
            .ok_or_else(|| BridgeError::WrongChainHandle {
                method: "withdraw".to_string(),
            })?;

        reporter.wait_for_confirm(&self.config.l1_network_name);
        let receiver = self.withdrawal_listeners.register()?;
        self.tracker
            .track(TrackingEvent::CompleteTransferToL1Initiated {
                recipient: transfer.recipient,
                source_tx: transfer.source_tx,
                amount: transfer.amount.clone(),
                symbol: transfer.symbol.clone(),
            });

        let pending = self
            .transactions
            .send(
                &bridge,
                "withdraw",
                &[
                    EvmCallArg::Uint(amount_units),
                    EvmCallArg::Address(recipient),
                ],
                TxOptions::default(),
            )
            .await?;
        reporter.withdraw_sent(transfer.amount.as_str(), &transfer.symbol);
        self.transactions.wait_mined("withdraw", pending).await?;

        reporter.await_event();
        let event = match receiver.await {
            Ok(event) => event,
            Err(_) => {
                info!(symbol = %transfer.symbol, "withdrawal event wait cleared");
                return Ok(None);
            }
        };

        self.tracker
            .track(TrackingEvent::CompleteTransferToL1Success {
                tx: TxRef::Evm(event.tx_hash),
            });
        let mut completed = transfer.clone();
        completed.destination_tx = Some(TxRef::Evm(event.tx_hash));
        completed.event = Some(BridgeEvent::Withdrawal(event));
        info!(symbol = %transfer.symbol, amount = %transfer.amount, "withdrawal completed");
        self.completions.transfer_completed(completed.clone());
        Ok(Some(completed))
    }
}
