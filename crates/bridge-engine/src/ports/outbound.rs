//! # Outbound Ports
//!
//! Traits for external dependencies: the two chains' clients, the analytics
//! tracker, the completion sink, and the progress consumer.

use crate::domain::{ChainClientError, TrackingEvent};
use crate::progress::ProgressUpdate;
use async_trait::async_trait;
use bridge_types::{EthAddress, Felt, L2TransactionStatus, Transfer, TxHash, U256};
use tokio::sync::oneshot;

/// Argument to an L1 contract method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmCallArg {
    /// An address argument.
    Address(EthAddress),
    /// An unsigned integer argument.
    Uint(U256),
}

/// Options attached to an L1 mutating call.
///
/// Native-asset transfers attach the amount here instead of as an argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxOptions {
    /// Native value sent along with the call.
    pub value: Option<U256>,
}

/// An L1 transaction past wallet signature acceptance.
///
/// `send` resolves with this as the submission acknowledgment, before
/// mining; `mined` resolves exactly once when the transaction is mined or
/// reverts, or never if the process ends first.
#[derive(Debug)]
pub struct PendingTransaction {
    /// Hash assigned at submission.
    pub tx_hash: TxHash,
    /// Resolves on mining (Ok) or revert/timeout (Err).
    pub mined: oneshot::Receiver<Result<(), ChainClientError>>,
}

/// L1 chain client - outbound port.
///
/// Mutating calls follow the send-and-mine model: submission is
/// acknowledged synchronously with wallet acceptance, mining completes
/// later through [`PendingTransaction::mined`].
#[async_trait]
pub trait EvmChainClient: Send + Sync {
    /// Read-only contract invocation returning a raw 256-bit value.
    async fn call(
        &self,
        contract: &EthAddress,
        method: &str,
        args: &[EvmCallArg],
    ) -> Result<U256, ChainClientError>;

    /// Native-asset balance of an account (no token contract involved).
    async fn native_balance(&self, account: &EthAddress) -> Result<U256, ChainClientError>;

    /// Mutating contract invocation; resolves at submission acknowledgment.
    async fn send(
        &self,
        contract: &EthAddress,
        method: &str,
        args: &[EvmCallArg],
        options: TxOptions,
    ) -> Result<PendingTransaction, ChainClientError>;
}

/// L2 chain client - outbound port.
///
/// The L2 client exposes no signed/mined split: `execute` returns a
/// submission hash and completion must be observed by status polling.
#[async_trait]
pub trait L2ChainClient: Send + Sync {
    /// Read-only contract invocation returning raw field elements.
    async fn call(
        &self,
        contract: &Felt,
        entrypoint: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, ChainClientError>;

    /// Mutating invocation; returns the submission hash immediately.
    async fn execute(
        &self,
        contract: &Felt,
        entrypoint: &str,
        calldata: &[Felt],
    ) -> Result<Felt, ChainClientError>;

    /// Current lifecycle status of a submitted transaction.
    async fn transaction_status(
        &self,
        tx_hash: &Felt,
    ) -> Result<L2TransactionStatus, ChainClientError>;
}

/// Analytics sink - outbound port. Fire-and-forget.
pub trait Tracker: Send + Sync {
    /// Record one analytics event.
    fn track(&self, event: TrackingEvent);
}

/// Terminal-transfer sink - outbound port.
///
/// Receives finalized transfers, and phase-A withdrawal records pending
/// phase B.
pub trait CompletionSink: Send + Sync {
    /// Accept a transfer record.
    fn transfer_completed(&self, transfer: Transfer);
}

/// Progress consumer - outbound port.
///
/// `active_step` is the authoritative current position and never decreases
/// within one transfer.
pub trait ProgressSink: Send + Sync {
    /// Accept one progress update.
    fn progress(&self, update: ProgressUpdate);
}
