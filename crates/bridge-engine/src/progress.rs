//! # Progress Reporting
//!
//! Emits ordered (step, title, message, severity) updates describing one
//! orchestrator run. Indices come from the flow's step enumeration; one
//! reporter lives exactly as long as its transfer.

use crate::domain::{invariant_step_advances, BridgeError, TransferFlow, TransferStep};
use crate::ports::ProgressSink;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Severity of a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressSeverity {
    /// Normal step transition.
    Info,
    /// Terminal failure report.
    Error,
}

/// One progress update handed to the consumer.
///
/// `active_step` is authoritative and never decreases within one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Short headline.
    pub title: String,
    /// Longer description.
    pub message: String,
    /// Zero-based index of the current step.
    pub active_step: usize,
    /// Step count of the whole flow.
    pub total_steps: usize,
    /// Update severity.
    pub severity: ProgressSeverity,
}

/// Per-run progress reporter over an externally supplied sink.
///
/// Enforces the strictly-increasing step invariant: a repeated or
/// regressing step index is dropped with a warning instead of reaching the
/// consumer.
pub struct ProgressReporter {
    flow: TransferFlow,
    sink: Arc<dyn ProgressSink>,
    last: Mutex<Option<usize>>,
}

impl ProgressReporter {
    /// Create a reporter for one flow.
    pub fn new(flow: TransferFlow, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            flow,
            sink,
            last: Mutex::new(None),
        }
    }

    fn step(&self, step: TransferStep, title: &str, message: String) {
        let Some(index) = self.flow.step_of(step) else {
            warn!(?step, flow = ?self.flow, "step not part of flow, dropping update");
            return;
        };
        {
            let mut last = self.last.lock();
            if let Err(violation) = invariant_step_advances(*last, index) {
                warn!(%violation, "dropping out-of-order progress update");
                return;
            }
            *last = Some(index);
        }
        self.sink.progress(ProgressUpdate {
            title: title.to_string(),
            message,
            active_step: index,
            total_steps: self.flow.total_steps(),
            severity: ProgressSeverity::Info,
        });
    }

    /// Capacity pre-flight underway.
    pub fn check_capacity(&self, symbol: &str) {
        self.step(
            TransferStep::CheckCapacity,
            "Checking bridge capacity",
            format!("Checking that the bridge can accept more {symbol}"),
        );
    }

    /// Token spending approval underway.
    pub fn approval(&self, symbol: &str) {
        self.step(
            TransferStep::Approve,
            "Approval required",
            format!("Requesting permission for the bridge to spend {symbol}"),
        );
    }

    /// Waiting for the user's wallet confirmation.
    pub fn wait_for_confirm(&self, network: &str) {
        self.step(
            TransferStep::ConfirmInWallet,
            "Confirm in wallet",
            format!("Confirm this transaction in your {network} wallet"),
        );
    }

    /// Deposit transaction acknowledged by the wallet.
    pub fn deposit_sent(&self, amount: &str, symbol: &str) {
        self.step(
            TransferStep::SubmitDeposit,
            "Deposit sent",
            format!("Deposit of {amount} {symbol} sent to the bridge"),
        );
    }

    /// Withdrawal-initiate transaction submitted on L2.
    pub fn initiate_withdraw_sent(&self, amount: &str, symbol: &str) {
        self.step(
            TransferStep::SubmitInitiateWithdraw,
            "Withdrawal initiated",
            format!("Withdrawal of {amount} {symbol} submitted on L2"),
        );
    }

    /// Polling L2 for the received status.
    pub fn await_l2_receipt(&self) {
        self.step(
            TransferStep::AwaitL2Receipt,
            "Waiting for L2",
            "Waiting for the transaction to be received on L2".to_string(),
        );
    }

    /// Withdraw transaction acknowledged by the wallet.
    pub fn withdraw_sent(&self, amount: &str, symbol: &str) {
        self.step(
            TransferStep::SubmitWithdraw,
            "Withdrawal sent",
            format!("Withdrawal of {amount} {symbol} sent to the bridge"),
        );
    }

    /// Waiting for the confirming bridge event.
    pub fn await_event(&self) {
        self.step(
            TransferStep::AwaitChainEvent,
            "Waiting for confirmation",
            "Waiting for the bridge confirmation event".to_string(),
        );
    }

    /// Terminal failure report; keeps the current step position.
    pub fn error(&self, error: &BridgeError) {
        let active_step = (*self.last.lock()).unwrap_or(0);
        self.sink.progress(ProgressUpdate {
            title: "Transfer failed".to_string(),
            message: error.to_string(),
            active_step,
            total_steps: self.flow.total_steps(),
            severity: ProgressSeverity::Error,
        });
    }
}
