//! # Tracking Events
//!
//! Typed analytics events, one family per flow: `*_initiated`, `*_success`,
//! `*_error`, plus the deposit-only `*_rejected` for capacity refusals
//! (a distinct outcome from a transaction failure).

use bridge_types::{ChainAddress, DecimalAmount, TxRef};
use serde::{Deserialize, Serialize};

/// An analytics event emitted by the orchestrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackingEvent {
    /// Deposit submission is about to happen.
    TransferToL2Initiated {
        /// Depositing L1 account.
        sender: ChainAddress,
        /// Receiving L2 account.
        recipient: ChainAddress,
        /// Human decimal amount.
        amount: DecimalAmount,
        /// Token symbol.
        symbol: String,
    },
    /// Deposit confirmed by the bridge event.
    TransferToL2Success {
        /// Transaction that emitted the confirming event.
        tx: TxRef,
    },
    /// Deposit failed.
    TransferToL2Error {
        /// Failure description.
        reason: String,
    },
    /// Deposit refused pre-flight by the capacity check.
    TransferToL2Rejected {
        /// Refusal description.
        reason: String,
    },

    /// Withdrawal initiation is about to happen on L2.
    TransferToL1Initiated {
        /// Withdrawing L2 account.
        sender: ChainAddress,
        /// Receiving L1 account.
        recipient: ChainAddress,
        /// Human decimal amount.
        amount: DecimalAmount,
        /// Token symbol.
        symbol: String,
    },
    /// Withdrawal initiation reached the received status on L2.
    TransferToL1Success {
        /// The L2 transaction.
        tx: TxRef,
    },
    /// Withdrawal initiation failed.
    TransferToL1Error {
        /// Failure description.
        reason: String,
    },

    /// Withdrawal completion is about to happen on L1.
    CompleteTransferToL1Initiated {
        /// Receiving L1 account.
        recipient: ChainAddress,
        /// The phase-A L2 transaction, when known.
        source_tx: Option<TxRef>,
        /// Human decimal amount.
        amount: DecimalAmount,
        /// Token symbol.
        symbol: String,
    },
    /// Withdrawal completion confirmed by the bridge event.
    CompleteTransferToL1Success {
        /// Transaction that emitted the confirming event.
        tx: TxRef,
    },
    /// Withdrawal completion failed.
    CompleteTransferToL1Error {
        /// Failure description.
        reason: String,
    },
}

impl TrackingEvent {
    /// Stable event name for the analytics sink.
    pub fn name(&self) -> &'static str {
        match self {
            TrackingEvent::TransferToL2Initiated { .. } => "transfer_to_l2_initiated",
            TrackingEvent::TransferToL2Success { .. } => "transfer_to_l2_success",
            TrackingEvent::TransferToL2Error { .. } => "transfer_to_l2_error",
            TrackingEvent::TransferToL2Rejected { .. } => "transfer_to_l2_rejected",
            TrackingEvent::TransferToL1Initiated { .. } => "transfer_to_l1_initiated",
            TrackingEvent::TransferToL1Success { .. } => "transfer_to_l1_success",
            TrackingEvent::TransferToL1Error { .. } => "transfer_to_l1_error",
            TrackingEvent::CompleteTransferToL1Initiated { .. } => {
                "complete_transfer_to_l1_initiated"
            }
            TrackingEvent::CompleteTransferToL1Success { .. } => {
                "complete_transfer_to_l1_success"
            }
            TrackingEvent::CompleteTransferToL1Error { .. } => "complete_transfer_to_l1_error",
        }
    }
}
