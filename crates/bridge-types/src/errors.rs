//! # Shared Error Types
//!
//! Input-validation errors for amounts and addresses. These fail fast,
//! before any network call is made.

use thiserror::Error;

/// Errors from parsing or converting decimal amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The string is not a valid decimal number.
    #[error("malformed decimal amount: {0:?}")]
    Malformed(String),

    /// The amount has more fractional digits than the token supports.
    #[error("amount {amount} has more than {decimals} fractional digits")]
    PrecisionLoss {
        /// The offending amount.
        amount: String,
        /// Fractional digits the token's on-chain encoding supports.
        decimals: u32,
    },

    /// The token's configured decimals exceed what a 256-bit integer can hold.
    #[error("unsupported decimals: {0}")]
    UnsupportedDecimals(u32),
}

/// Errors from parsing chain-specific addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Not a valid 20-byte hex L1 address.
    #[error("malformed L1 address: {0:?}")]
    InvalidL1(String),

    /// Not a valid hex field element.
    #[error("malformed field element: {0:?}")]
    InvalidFelt(String),

    /// Numerically valid but not below the L2 field prime.
    #[error("field element out of range: {0}")]
    FeltOutOfRange(String),
}
