//! # Engine Errors
//!
//! The error taxonomy for transfer orchestration.
//!
//! Validation errors ([`AmountError`], [`AddressError`]) fail before any
//! network call. Read failures are retried only inside the balance poller;
//! transaction failures are never retried, since resubmitting a mutating
//! call risks a duplicate effect.

use bridge_types::{AddressError, AmountError};
use thiserror::Error;

/// Result alias for engine operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Transport-level failure reported by a chain client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainClientError {
    /// RPC transport failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Contract call or transaction reverted.
    #[error("reverted: {0}")]
    Reverted(String),

    /// The wallet refused to sign.
    #[error("wallet rejected: {0}")]
    WalletRejected(String),
}

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Deposit would push the bridge past its aggregate balance cap.
    /// Pre-flight validation; no chain mutation was attempted.
    #[error(
        "deposit of {amount} {symbol} exceeds bridge capacity: \
         held {bridge_balance}, cap {max_total_balance}"
    )]
    CapacityExceeded {
        /// Token symbol.
        symbol: String,
        /// Requested deposit amount.
        amount: String,
        /// Current bridge-held balance.
        bridge_balance: String,
        /// Configured aggregate cap.
        max_total_balance: String,
    },

    /// A read-only contract invocation failed.
    #[error("contract call `{method}` failed: {cause}")]
    ContractCall {
        /// Invoked method name.
        method: String,
        /// Underlying client failure.
        #[source]
        cause: ChainClientError,
    },

    /// A mutating contract invocation failed at submission, signing, or
    /// mining.
    #[error("transaction `{method}` failed: {cause}")]
    Transaction {
        /// Invoked method name.
        method: String,
        /// Underlying client failure.
        #[source]
        cause: ChainClientError,
    },

    /// Amount validation failure.
    #[error(transparent)]
    Precision(#[from] AmountError),

    /// Address validation failure.
    #[error(transparent)]
    AddressFormat(#[from] AddressError),

    /// A chain-event listener is already active on this slot.
    #[error("an event listener is already active for this transfer")]
    ListenerActive,

    /// No token with this symbol is configured on the requested side.
    #[error("token {0} is not configured")]
    UnknownToken(String),

    /// The token is missing a required contract address for the network.
    #[error("token {symbol} has no {role} address on this network")]
    MissingAddress {
        /// Token symbol.
        symbol: String,
        /// Which address is missing ("bridge" or "token").
        role: &'static str,
    },

    /// A contract handle or argument targets the other chain than the
    /// invoked method expects.
    #[error("method `{method}` received a handle for the wrong chain")]
    WrongChainHandle {
        /// Invoked method name.
        method: String,
    },
}

impl BridgeError {
    /// Wrap a client failure from a read-only call.
    pub fn call(method: &str, cause: ChainClientError) -> Self {
        Self::ContractCall {
            method: method.to_string(),
            cause,
        }
    }

    /// Wrap a client failure from a mutating call.
    pub fn transaction(method: &str, cause: ChainClientError) -> Self {
        Self::Transaction {
            method: method.to_string(),
            cause,
        }
    }

    /// Whether this is the pre-flight capacity rejection, which is tracked
    /// as a distinct analytics outcome from a transaction failure.
    pub fn is_capacity_rejection(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}
