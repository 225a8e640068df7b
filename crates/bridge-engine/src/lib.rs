//! # bridge-engine
//!
//! Transfer orchestration for an L1 <-> L2 token bridge.
//!
//! ## Overview
//!
//! The engine drives three user-facing flows:
//! - **Deposit** (L1 -> L2): capacity pre-flight, conditional allowance
//!   approval, deposit submission, confirmation by the bridge's `Deposit`
//!   event.
//! - **Withdrawal, phase A** (L2): `initiate_withdraw` submission, status
//!   polling until the sequencer reports the transaction received.
//! - **Withdrawal, phase B** (L1): `withdraw` submission, confirmation by
//!   the bridge's `Withdrawal` event.
//!
//! ## Architecture
//!
//! ```text
//! TransferApi (inbound)
//!       │
//!  BridgeService ──┬── ContractCallGateway ─────┐
//!       │          ├── ContractTransactionGateway ├──→ EvmChainClient / L2ChainClient
//!       │          ├── EventListenerRegistry      │        (outbound)
//!       │          └── BalancePoller ── TokenTable┘
//!       │
//!       └──→ Tracker / ProgressSink / CompletionSink (outbound)
//! ```
//!
//! All amounts cross the API as human decimal strings; conversion to each
//! chain's integer encoding is bit-exact and happens only at the gateway
//! boundary.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bridge_engine::{BridgeConfig, BridgeService};
//! use bridge_engine::ports::inbound::TransferApi;
//!
//! let service = BridgeService::new(
//!     BridgeConfig::default(),
//!     evm_client,
//!     l2_client,
//!     tracker,
//!     progress,
//!     completions,
//!     l1_account,
//!     l2_account,
//! );
//!
//! let transfer = service.transfer_to_l2(&token, amount).await?;
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod gateways;
pub mod listener;
pub mod poller;
pub mod ports;
pub mod progress;
pub mod service;
pub mod tokens;

pub use domain::{
    BridgeError, BridgeResult, ChainClientError, TrackingEvent, TransferFlow, TransferStep,
};
pub use gateways::{BridgeConstant, CallArg, ContractCallGateway, ContractTransactionGateway};
pub use listener::EventListenerRegistry;
pub use poller::{BalancePoller, BalanceReader};
pub use ports::inbound::TransferApi;
pub use ports::outbound::{
    CompletionSink, EvmCallArg, EvmChainClient, L2ChainClient, PendingTransaction, ProgressSink,
    Tracker, TxOptions,
};
pub use progress::{ProgressReporter, ProgressSeverity, ProgressUpdate};
pub use service::{BridgeConfig, BridgeService};
pub use tokens::{TokenPatch, TokenTable};
