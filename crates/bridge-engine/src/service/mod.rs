//! # Bridge Service
//!
//! Wires the gateways, the token table, the balance poller, the event
//! listener registries, and the outbound sinks into the transfer API. One
//! service instance models one connected session: one L1 account, one L2
//! account, one token list.

mod deposit;
mod withdraw;

use crate::domain::{BridgeError, BridgeResult};
use crate::gateways::{CallArg, ContractCallGateway, ContractTransactionGateway};
use crate::listener::EventListenerRegistry;
use crate::poller::{BalancePoller, BalanceReader};
use crate::ports::inbound::TransferApi;
use crate::ports::outbound::{
    CompletionSink, EvmChainClient, L2ChainClient, ProgressSink, Tracker,
};
use crate::tokens::TokenTable;
use async_trait::async_trait;
use bridge_types::{
    ChainAddress, ChainId, ChainLayer, DecimalAmount, DepositEvent, EthAddress, Felt, Token,
    Transfer, WithdrawalEvent,
};
use std::sync::Arc;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// L1 network the session is connected to.
    pub l1_chain: ChainId,
    /// L2 network the session is connected to.
    pub l2_chain: ChainId,
    /// L1 network name shown in wallet prompts.
    pub l1_network_name: String,
    /// L2 network name shown in wallet prompts.
    pub l2_network_name: String,
    /// Interval between L2 transaction status polls, in milliseconds.
    pub l2_poll_interval_ms: u64,
    /// Attempts per balance fetch before degrading to unknown.
    pub balance_fetch_attempts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            l1_chain: ChainId::Mainnet,
            l2_chain: ChainId::L2Mainnet,
            l1_network_name: "Ethereum".to_string(),
            l2_network_name: "L2".to_string(),
            l2_poll_interval_ms: 5_000,
            balance_fetch_attempts: 5,
        }
    }
}

/// The transfer orchestration service.
pub struct BridgeService {
    config: BridgeConfig,
    calls: Arc<ContractCallGateway>,
    transactions: ContractTransactionGateway,
    tokens: Arc<TokenTable>,
    poller: Arc<BalancePoller>,
    deposit_listeners: Arc<EventListenerRegistry<DepositEvent>>,
    withdrawal_listeners: Arc<EventListenerRegistry<WithdrawalEvent>>,
    tracker: Arc<dyn Tracker>,
    progress: Arc<dyn ProgressSink>,
    completions: Arc<dyn CompletionSink>,
    l1_account: EthAddress,
    l2_account: Felt,
}

impl BridgeService {
    /// Assemble a service for one connected session.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: BridgeConfig,
        evm: Arc<dyn EvmChainClient>,
        l2: Arc<dyn L2ChainClient>,
        tracker: Arc<dyn Tracker>,
        progress: Arc<dyn ProgressSink>,
        completions: Arc<dyn CompletionSink>,
        l1_account: EthAddress,
        l2_account: Felt,
    ) -> Self {
        let calls = Arc::new(ContractCallGateway::new(evm.clone(), l2.clone()));
        let transactions = ContractTransactionGateway::new(
            evm,
            l2,
            Duration::from_millis(config.l2_poll_interval_ms),
        );
        let tokens = Arc::new(TokenTable::new());
        let poller = Arc::new(BalancePoller::new(
            tokens.clone(),
            config.balance_fetch_attempts,
        ));
        Self {
            config,
            calls,
            transactions,
            tokens,
            poller,
            deposit_listeners: Arc::new(EventListenerRegistry::new()),
            withdrawal_listeners: Arc::new(EventListenerRegistry::new()),
            tracker,
            progress,
            completions,
            l1_account,
            l2_account,
        }
    }

    /// The session's token table.
    pub fn tokens(&self) -> &Arc<TokenTable> {
        &self.tokens
    }

    /// Registry the chain event pump delivers `Deposit` events into.
    pub fn deposit_listeners(&self) -> &Arc<EventListenerRegistry<DepositEvent>> {
        &self.deposit_listeners
    }

    /// Registry the chain event pump delivers `Withdrawal` events into.
    pub fn withdrawal_listeners(&self) -> &Arc<EventListenerRegistry<WithdrawalEvent>> {
        &self.withdrawal_listeners
    }

    /// Cap on a single deposit of `token`, read from its L1 bridge
    /// contract and cached for the session.
    pub async fn max_deposit(&self, token: &Token) -> BridgeResult<DecimalAmount> {
        let bridge = self.bridge_address(token, self.config.l1_chain)?;
        self.calls
            .constant(
                &bridge,
                crate::gateways::BridgeConstant::MaxDeposit,
                &token.symbol,
                token.decimals,
            )
            .await
    }

    /// Refresh every token balance, or only `symbol`'s, in the background.
    pub fn refresh_balances(&self, symbol: Option<&str>) {
        let reader = Arc::new(AccountBalanceReader {
            calls: self.calls.clone(),
            l1_chain: self.config.l1_chain,
            l2_chain: self.config.l2_chain,
            l1_account: self.l1_account,
            l2_account: self.l2_account,
        });
        self.poller.refresh(reader, symbol);
    }

    fn bridge_address(&self, token: &Token, chain: ChainId) -> BridgeResult<ChainAddress> {
        token
            .bridge_address_on(chain)
            .copied()
            .ok_or_else(|| BridgeError::MissingAddress {
                symbol: token.symbol.clone(),
                role: "bridge",
            })
    }

    fn token_address(&self, token: &Token, chain: ChainId) -> BridgeResult<ChainAddress> {
        token
            .token_address_on(chain)
            .copied()
            .ok_or_else(|| BridgeError::MissingAddress {
                symbol: token.symbol.clone(),
                role: "token",
            })
    }
}

#[async_trait]
impl TransferApi for BridgeService {
    async fn transfer_to_l2(
        &self,
        token: &Token,
        amount: DecimalAmount,
    ) -> BridgeResult<Option<Transfer>> {
        self.run_deposit(token, amount).await
    }

    async fn transfer_to_l1(
        &self,
        token: &Token,
        amount: DecimalAmount,
    ) -> BridgeResult<Transfer> {
        self.run_initiate_withdraw(token, amount).await
    }

    async fn complete_transfer_to_l1(
        &self,
        transfer: &Transfer,
    ) -> BridgeResult<Option<Transfer>> {
        self.run_complete_withdraw(transfer).await
    }
}

/// Balance reads for the session's own accounts, on either side.
struct AccountBalanceReader {
    calls: Arc<ContractCallGateway>,
    l1_chain: ChainId,
    l2_chain: ChainId,
    l1_account: EthAddress,
    l2_account: Felt,
}

#[async_trait]
impl BalanceReader for AccountBalanceReader {
    async fn balance_of(&self, token: &Token) -> BridgeResult<DecimalAmount> {
        match token.layer {
            ChainLayer::L1 if token.is_native(self.l1_chain) => {
                self.calls
                    .native_balance(&self.l1_account, token.decimals)
                    .await
            }
            ChainLayer::L1 => {
                let contract = token
                    .token_address_on(self.l1_chain)
                    .ok_or_else(|| BridgeError::MissingAddress {
                        symbol: token.symbol.clone(),
                        role: "token",
                    })?;
                self.calls
                    .call(
                        contract,
                        "balanceOf",
                        &[CallArg::Address(ChainAddress::Evm(self.l1_account))],
                        token.decimals,
                    )
                    .await
            }
            ChainLayer::L2 => {
                let contract = token
                    .token_address_on(self.l2_chain)
                    .ok_or_else(|| BridgeError::MissingAddress {
                        symbol: token.symbol.clone(),
                        role: "token",
                    })?;
                self.calls
                    .call(
                        contract,
                        "balanceOf",
                        &[CallArg::Address(ChainAddress::L2(self.l2_account))],
                        token.decimals,
                    )
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryEvmChain, InMemoryL2Chain};
    use bridge_types::U256;

    #[tokio::test]
    async fn test_account_reader_dispatches_by_layer() {
        let l1_account = EthAddress::new([0xAA; 20]);
        let l2_account = Felt::from(0xBBu64);
        let evm = Arc::new(InMemoryEvmChain::new(l1_account));
        let l2 = Arc::new(InMemoryL2Chain::new());

        let usdc_l1 = EthAddress::new([1u8; 20]);
        let usdc_l2 = Felt::from(2u64);
        evm.set_native_balance(&l1_account, U256::from(3_000_000_000_000_000_000u128));
        evm.set_token_balance(&usdc_l1, &l1_account, U256::from(5_000_000u64));
        l2.set_balance(&usdc_l2, &l2_account, U256::from(7_000_000u64));

        let reader = AccountBalanceReader {
            calls: Arc::new(ContractCallGateway::new(evm, l2)),
            l1_chain: ChainId::Mainnet,
            l2_chain: ChainId::L2Mainnet,
            l1_account,
            l2_account,
        };

        let eth = Token::new("ETH", "Ether", 18, ChainLayer::L1);
        assert_eq!(reader.balance_of(&eth).await.unwrap().as_str(), "3");

        let l1_token = Token::new("USDC", "USD Coin", 6, ChainLayer::L1).with_token_address(
            ChainId::Mainnet,
            ChainAddress::Evm(usdc_l1),
        );
        assert_eq!(reader.balance_of(&l1_token).await.unwrap().as_str(), "5");

        let l2_token = Token::new("USDC", "USD Coin", 6, ChainLayer::L2).with_token_address(
            ChainId::L2Mainnet,
            ChainAddress::L2(usdc_l2),
        );
        assert_eq!(reader.balance_of(&l2_token).await.unwrap().as_str(), "7");
    }

    #[tokio::test]
    async fn test_missing_token_address_is_reported() {
        let evm = Arc::new(InMemoryEvmChain::new(EthAddress::new([0xAA; 20])));
        let l2 = Arc::new(InMemoryL2Chain::new());
        let reader = AccountBalanceReader {
            calls: Arc::new(ContractCallGateway::new(evm, l2)),
            l1_chain: ChainId::Mainnet,
            l2_chain: ChainId::L2Mainnet,
            l1_account: EthAddress::new([0xAA; 20]),
            l2_account: Felt::from(1u64),
        };

        let token = Token::new("DAI", "Dai", 18, ChainLayer::L2);
        let err = reader.balance_of(&token).await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingAddress { role: "token", .. }
        ));
    }
}
