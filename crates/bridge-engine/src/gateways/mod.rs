//! # Contract Gateways
//!
//! Thin invocation layers between the orchestrators and the chain clients.
//! The call gateway handles reads and decimal normalization, the
//! transaction gateway handles mutations and their two-stage resolution.

mod call;
mod transaction;

pub use call::{BridgeConstant, CallArg, ContractCallGateway};
pub use transaction::ContractTransactionGateway;
