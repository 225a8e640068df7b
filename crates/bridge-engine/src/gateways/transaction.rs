//! # Contract Transaction Gateway
//!
//! Mutating invocations. An L1 send resolves in two stages, submission and
//! mining, mirroring how wallets report a transaction: the hash is known as
//! soon as the wallet signs, the outcome only once a block includes it. L2
//! finality is observed by polling transaction status rather than waiting
//! on a receipt.

use crate::domain::{BridgeError, BridgeResult, ChainClientError};
use crate::ports::outbound::{EvmCallArg, EvmChainClient, L2ChainClient, PendingTransaction, TxOptions};
use bridge_types::{ChainAddress, Felt, L2TransactionStatus, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Mutating contract gateway over both chain clients.
pub struct ContractTransactionGateway {
    evm: Arc<dyn EvmChainClient>,
    l2: Arc<dyn L2ChainClient>,
    l2_poll_interval: Duration,
}

impl ContractTransactionGateway {
    /// Create a gateway over the two chain clients.
    pub fn new(
        evm: Arc<dyn EvmChainClient>,
        l2: Arc<dyn L2ChainClient>,
        l2_poll_interval: Duration,
    ) -> Self {
        Self {
            evm,
            l2,
            l2_poll_interval,
        }
    }

    /// Submit an L1 transaction. Resolves once the wallet has signed and
    /// the transaction is on the wire; mining is awaited separately via
    /// [`wait_mined`](Self::wait_mined).
    pub async fn send(
        &self,
        contract: &ChainAddress,
        method: &str,
        args: &[EvmCallArg],
        options: TxOptions,
    ) -> BridgeResult<PendingTransaction> {
        let address = contract
            .as_evm()
            .ok_or_else(|| BridgeError::WrongChainHandle {
                method: method.to_string(),
            })?;
        let pending = self
            .evm
            .send(address, method, args, options)
            .await
            .map_err(|cause| BridgeError::transaction(method, cause))?;
        debug!(method, tx_hash = %hex::encode(pending.tx_hash), "transaction submitted");
        Ok(pending)
    }

    /// Await the mining outcome of a submitted L1 transaction.
    ///
    /// A dropped channel means the client abandoned the transaction and is
    /// reported as a transaction failure.
    pub async fn wait_mined(
        &self,
        method: &str,
        pending: PendingTransaction,
    ) -> BridgeResult<TxHash> {
        let tx_hash = pending.tx_hash;
        let outcome = pending.mined.await.map_err(|_| {
            BridgeError::transaction(
                method,
                ChainClientError::Rpc("transaction outcome channel closed".to_string()),
            )
        })?;
        outcome.map_err(|cause| BridgeError::transaction(method, cause))?;
        Ok(tx_hash)
    }

    /// Invoke an L2 contract entrypoint, returning the transaction hash.
    pub async fn execute(
        &self,
        contract: &ChainAddress,
        entrypoint: &str,
        calldata: Vec<Felt>,
    ) -> BridgeResult<Felt> {
        let address = contract
            .as_l2()
            .ok_or_else(|| BridgeError::WrongChainHandle {
                method: entrypoint.to_string(),
            })?;
        let tx_hash = self
            .l2
            .execute(address, entrypoint, &calldata)
            .await
            .map_err(|cause| BridgeError::transaction(entrypoint, cause))?;
        debug!(entrypoint, tx_hash = %tx_hash, "l2 transaction submitted");
        Ok(tx_hash)
    }

    /// Poll an L2 transaction until its status reaches `target` or the
    /// sequencer rejects it.
    pub async fn wait_for_status(
        &self,
        method: &str,
        tx_hash: &Felt,
        target: L2TransactionStatus,
    ) -> BridgeResult<()> {
        loop {
            let status = self
                .l2
                .transaction_status(tx_hash)
                .await
                .map_err(|cause| BridgeError::call("get_transaction_status", cause))?;
            if status.is_rejected() {
                warn!(method, tx_hash = %tx_hash, "l2 transaction rejected");
                return Err(BridgeError::transaction(
                    method,
                    ChainClientError::Reverted("transaction rejected by the sequencer".to_string()),
                ));
            }
            if status.at_least(target) {
                debug!(method, tx_hash = %tx_hash, ?status, "l2 status reached");
                return Ok(());
            }
            tokio::time::sleep(self.l2_poll_interval).await;
        }
    }
}
