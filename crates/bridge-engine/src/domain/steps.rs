//! # Transfer Steps
//!
//! Ordered step enumerations, one sequence per flow. Step indices reported
//! during one orchestrator run are strictly increasing: never repeated,
//! never regressing.

use serde::{Deserialize, Serialize};

/// A single orchestration step. Flows share steps but order them
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStep {
    /// Pre-flight check against the bridge's aggregate balance cap.
    CheckCapacity,
    /// ERC-20 style allowance approval; skipped for the native asset.
    Approve,
    /// Waiting for the user to confirm in their wallet.
    ConfirmInWallet,
    /// Deposit transaction submitted to L1.
    SubmitDeposit,
    /// Withdrawal-initiate transaction submitted to L2.
    SubmitInitiateWithdraw,
    /// Polling L2 until the transaction is received.
    AwaitL2Receipt,
    /// Withdraw transaction submitted to L1.
    SubmitWithdraw,
    /// Waiting for the confirming bridge event.
    AwaitChainEvent,
}

/// The three orchestration flows, each with its own step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferFlow {
    /// L1 -> L2 deposit.
    Deposit,
    /// L2 -> L1 withdrawal, phase A (initiate on L2).
    WithdrawInitiate,
    /// L2 -> L1 withdrawal, phase B (complete on L1).
    WithdrawComplete,
}

impl TransferFlow {
    /// The ordered step sequence for this flow.
    pub fn steps(&self) -> &'static [TransferStep] {
        match self {
            TransferFlow::Deposit => &[
                TransferStep::CheckCapacity,
                TransferStep::Approve,
                TransferStep::ConfirmInWallet,
                TransferStep::SubmitDeposit,
                TransferStep::AwaitChainEvent,
            ],
            TransferFlow::WithdrawInitiate => &[
                TransferStep::ConfirmInWallet,
                TransferStep::SubmitInitiateWithdraw,
                TransferStep::AwaitL2Receipt,
            ],
            TransferFlow::WithdrawComplete => &[
                TransferStep::ConfirmInWallet,
                TransferStep::SubmitWithdraw,
                TransferStep::AwaitChainEvent,
            ],
        }
    }

    /// Number of steps in this flow.
    pub fn total_steps(&self) -> usize {
        self.steps().len()
    }

    /// Zero-based index of a step within this flow.
    pub fn step_of(&self, step: TransferStep) -> Option<usize> {
        self.steps().iter().position(|s| *s == step)
    }
}
