//! # Inbound Ports
//!
//! The API surface the UI layer drives.

use crate::domain::BridgeResult;
use async_trait::async_trait;
use bridge_types::{DecimalAmount, Token, Transfer};

/// Transfer orchestration API - inbound port.
///
/// One call per user-initiated transfer; progress, tracking, and completion
/// flow through the outbound ports while the call is suspended.
#[async_trait]
pub trait TransferApi: Send + Sync {
    /// Deposit: move `amount` of `token` from L1 to L2.
    ///
    /// Resolves with the finalized transfer once the bridge's Deposit event
    /// arrives, or `None` if the caller cleared the event wait.
    async fn transfer_to_l2(
        &self,
        token: &Token,
        amount: DecimalAmount,
    ) -> BridgeResult<Option<Transfer>>;

    /// Withdrawal phase A: initiate on L2 and wait for the received status.
    ///
    /// Resolves with a transfer carrying only the L2 reference, pending
    /// phase B.
    async fn transfer_to_l1(&self, token: &Token, amount: DecimalAmount)
        -> BridgeResult<Transfer>;

    /// Withdrawal phase B: complete a previously initiated withdrawal on L1.
    ///
    /// Resolves with the finalized transfer once the bridge's Withdrawal
    /// event arrives, or `None` if the caller cleared the event wait.
    async fn complete_transfer_to_l1(&self, transfer: &Transfer)
        -> BridgeResult<Option<Transfer>>;
}
