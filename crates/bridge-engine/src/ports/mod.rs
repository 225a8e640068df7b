//! # Ports Module
//!
//! Hexagonal ports: the inbound transfer API and the outbound dependencies.

pub mod inbound;
pub mod outbound;

pub use inbound::TransferApi;
pub use outbound::{
    CompletionSink, EvmCallArg, EvmChainClient, L2ChainClient, PendingTransaction, ProgressSink,
    Tracker, TxOptions,
};
