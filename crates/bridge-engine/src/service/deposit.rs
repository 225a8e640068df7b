//! # Deposit Orchestration
//!
//! The L1 -> L2 flow: capacity pre-flight, conditional allowance approval,
//! deposit submission, and the wait for the bridge's confirming `Deposit`
//! event. The initiated tracking event fires once the transfer is cleared
//! to submit, before the wallet is asked to sign.

use super::BridgeService;
use crate::algorithms::units::{max_allowance, to_chain_units};
use crate::domain::{BridgeError, BridgeResult, TrackingEvent, TransferFlow};
use crate::gateways::{BridgeConstant, CallArg};
use crate::ports::outbound::{EvmCallArg, TxOptions};
use crate::progress::ProgressReporter;
use bridge_types::{
    BridgeEvent, ChainAddress, DecimalAmount, Token, Transfer, TransferDirection, TxRef, U256,
};
use tracing::{info, warn};

impl BridgeService {
    pub(super) async fn run_deposit(
        &self,
        token: &Token,
        amount: DecimalAmount,
    ) -> BridgeResult<Option<Transfer>> {
        info!(symbol = %token.symbol, %amount, "deposit requested");
        let reporter = ProgressReporter::new(TransferFlow::Deposit, self.progress.clone());

        match self.deposit_inner(token, &amount, &reporter).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                // An abandoned subscription must not swallow the next run's
                // event. ListenerActive means the slot belongs to another
                // run; that registration stays live.
                if !matches!(error, BridgeError::ListenerActive) {
                    self.deposit_listeners.clear();
                }
                warn!(symbol = %token.symbol, %error, "deposit failed");
                if error.is_capacity_rejection() {
                    self.tracker.track(TrackingEvent::TransferToL2Rejected {
                        reason: error.to_string(),
                    });
                } else {
                    self.tracker.track(TrackingEvent::TransferToL2Error {
                        reason: error.to_string(),
                    });
                }
                reporter.error(&error);
                Err(error)
            }
        }
    }

    async fn deposit_inner(
        &self,
        token: &Token,
        amount: &DecimalAmount,
        reporter: &ProgressReporter,
    ) -> BridgeResult<Option<Transfer>> {
        let chain = self.config.l1_chain;
        let bridge = self.bridge_address(token, chain)?;
        let amount_units = to_chain_units(amount, token.decimals)?;

        reporter.check_capacity(&token.symbol);
        self.check_capacity(token, amount, amount_units, &bridge)
            .await?;

        if !token.is_native(chain) {
            self.ensure_allowance(token, amount_units, &bridge, reporter)
                .await?;
        }

        reporter.wait_for_confirm(&self.config.l1_network_name);
        let receiver = self.deposit_listeners.register()?;
        self.tracker.track(TrackingEvent::TransferToL2Initiated {
            sender: ChainAddress::Evm(self.l1_account),
            recipient: ChainAddress::L2(self.l2_account),
            amount: amount.clone(),
            symbol: token.symbol.clone(),
        });

        // The native asset travels as call value; tokens travel as an
        // amount argument.
        let recipient_word = EvmCallArg::Uint(self.l2_account.to_u256());
        let (args, options) = if token.is_native(chain) {
            (
                vec![recipient_word],
                TxOptions {
                    value: Some(amount_units),
                },
            )
        } else {
            (
                vec![EvmCallArg::Uint(amount_units), recipient_word],
                TxOptions::default(),
            )
        };

        let pending = self
            .transactions
            .send(&bridge, "deposit", &args, options)
            .await?;
        reporter.deposit_sent(amount.as_str(), &token.symbol);
        let submitted = self.transactions.wait_mined("deposit", pending).await?;

        reporter.await_event();
        let event = match receiver.await {
            Ok(event) => event,
            Err(_) => {
                info!(symbol = %token.symbol, "deposit event wait cleared");
                return Ok(None);
            }
        };

        self.tracker.track(TrackingEvent::TransferToL2Success {
            tx: TxRef::Evm(event.tx_hash),
        });
        let transfer = Transfer {
            direction: TransferDirection::L1ToL2,
            sender: ChainAddress::Evm(self.l1_account),
            recipient: ChainAddress::L2(self.l2_account),
            symbol: token.symbol.clone(),
            display_name: token.display_name.clone(),
            amount: amount.clone(),
            source_tx: Some(TxRef::Evm(submitted)),
            destination_tx: Some(TxRef::Evm(event.tx_hash)),
            event: Some(BridgeEvent::Deposit(event)),
        };
        info!(symbol = %token.symbol, %amount, "deposit confirmed");
        self.completions.transfer_completed(transfer.clone());
        Ok(Some(transfer))
    }

    /// Refuse the deposit when it would push the bridge past its aggregate
    /// balance cap. Compared in chain units so no rounding is involved.
    async fn check_capacity(
        &self,
        token: &Token,
        amount: &DecimalAmount,
        amount_units: U256,
        bridge: &ChainAddress,
    ) -> BridgeResult<()> {
        let chain = self.config.l1_chain;
        let bridge_balance = if token.is_native(chain) {
            let bridge_account = bridge.as_evm().ok_or_else(|| BridgeError::WrongChainHandle {
                method: "getBalance".to_string(),
            })?;
            self.calls
                .native_balance(bridge_account, token.decimals)
                .await?
        } else {
            let token_contract = self.token_address(token, chain)?;
            self.calls
                .call(
                    &token_contract,
                    "balanceOf",
                    &[CallArg::Address(*bridge)],
                    token.decimals,
                )
                .await?
        };
        let cap = self
            .calls
            .constant(
                bridge,
                BridgeConstant::MaxTotalBalance,
                &token.symbol,
                token.decimals,
            )
            .await?;

        let held_units = to_chain_units(&bridge_balance, token.decimals)?;
        let cap_units = to_chain_units(&cap, token.decimals)?;
        match held_units.checked_add(amount_units) {
            Some(total) if total <= cap_units => Ok(()),
            _ => Err(BridgeError::CapacityExceeded {
                symbol: token.symbol.clone(),
                amount: amount.to_string(),
                bridge_balance: bridge_balance.to_string(),
                max_total_balance: cap.to_string(),
            }),
        }
    }

    /// Approve the bridge for the sentinel maximum allowance when the
    /// current allowance cannot cover this deposit. The approval is awaited
    /// only to submission; the deposit rides behind it in the same wallet
    /// session.
    async fn ensure_allowance(
        &self,
        token: &Token,
        amount_units: U256,
        bridge: &ChainAddress,
        reporter: &ProgressReporter,
    ) -> BridgeResult<()> {
        let chain = self.config.l1_chain;
        let token_contract = self.token_address(token, chain)?;
        let allowance = self
            .calls
            .call_raw(
                &token_contract,
                "allowance",
                &[
                    CallArg::Address(ChainAddress::Evm(self.l1_account)),
                    CallArg::Address(*bridge),
                ],
            )
            .await?;
        if allowance >= amount_units {
            return Ok(());
        }

        reporter.approval(&token.symbol);
        let spender = bridge.as_evm().ok_or_else(|| BridgeError::WrongChainHandle {
            method: "approve".to_string(),
        })?;
        info!(symbol = %token.symbol, "requesting maximum allowance approval");
        self.transactions
            .send(
                &token_contract,
                "approve",
                &[
                    EvmCallArg::Address(*spender),
                    EvmCallArg::Uint(max_allowance()),
                ],
                TxOptions::default(),
            )
            .await?;
        Ok(())
    }
}
