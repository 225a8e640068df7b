//! # Bridge Types
//!
//! Shared domain entities for the L1 <-> L2 token bridge.
//!
//! ## Clusters
//!
//! - **Addresses & encodings**: [`EthAddress`], [`Felt`], [`ChainAddress`]
//! - **Tokens**: [`Token`], [`TokenBalance`]
//! - **Transfers**: [`Transfer`], [`TransferDirection`], [`BridgeEvent`]
//! - **Amounts**: [`DecimalAmount`] (exact decimal strings, no floats)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod amount;
pub mod entities;
pub mod errors;

pub use amount::DecimalAmount;
pub use entities::{
    field_prime, BridgeEvent, ChainAddress, ChainId, ChainLayer, DepositEvent, EthAddress, Felt,
    L2TransactionStatus, Token, TokenBalance, Transfer, TransferDirection, TxHash, TxRef,
    WithdrawalEvent, U256,
};
pub use errors::{AddressError, AmountError};
