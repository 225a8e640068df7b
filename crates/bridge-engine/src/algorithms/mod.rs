//! # Algorithms Module
//!
//! Pure conversion logic between human amounts and chain encodings.

pub mod units;

pub use units::{
    address_to_felt, felt_from_u128, from_chain_units, from_uint256_parts, max_allowance,
    to_chain_units, to_uint256_parts,
};
