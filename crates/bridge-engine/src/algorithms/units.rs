//! # Unit Conversion
//!
//! Bit-exact conversion between human decimal amounts and each chain's
//! native numeric encoding: fixed-point 256-bit integers on L1, a split
//! low/high pair of field elements on L2. String arithmetic throughout;
//! no floats touch an amount anywhere in the engine.

use bridge_types::{AmountError, DecimalAmount, EthAddress, Felt, U256};

/// Largest power of ten representable in 256 bits.
const MAX_DECIMALS: u32 = 77;

/// `10^decimals` as a 256-bit integer.
fn pow10(decimals: u32) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }
    Ok(U256::from(10).pow(U256::from(decimals)))
}

/// Convert a human decimal amount to chain units.
///
/// Lossless for amounts representable within `decimals` fractional digits;
/// fails with [`AmountError::PrecisionLoss`] otherwise.
pub fn to_chain_units(amount: &DecimalAmount, decimals: u32) -> Result<U256, AmountError> {
    pow10(decimals)?;
    let (int_part, frac_part) = amount.parts();
    if frac_part.len() as u32 > decimals {
        return Err(AmountError::PrecisionLoss {
            amount: amount.to_string(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in frac_part.len() as u32..decimals {
        digits.push('0');
    }

    U256::from_dec_str(&digits).map_err(|_| AmountError::Malformed(amount.to_string()))
}

/// Convert chain units back to a human decimal amount.
///
/// Exact inverse of [`to_chain_units`]: round-trip identity holds for every
/// value that conversion can produce.
pub fn from_chain_units(raw: U256, decimals: u32) -> DecimalAmount {
    let digits = raw.to_string();
    let text = if decimals == 0 {
        digits
    } else {
        let width = decimals as usize + 1;
        let padded = format!("{digits:0>width$}");
        let split = padded.len() - decimals as usize;
        format!("{}.{}", &padded[..split], &padded[split..])
    };
    DecimalAmount::new(&text).unwrap_or_else(|_| unreachable!("constructed digits are valid"))
}

/// Split chain units into the L2 calldata encoding: (low, high) 128-bit
/// halves, each carried as one field element.
pub fn to_uint256_parts(raw: U256) -> (u128, u128) {
    (raw.low_u128(), (raw >> 128).low_u128())
}

/// Rejoin the L2 split encoding into chain units.
pub fn from_uint256_parts(low: u128, high: u128) -> U256 {
    (U256::from(high) << 128) | U256::from(low)
}

/// Encode an L1 address as an L2 field element.
pub fn address_to_felt(address: &EthAddress) -> Felt {
    Felt::from(*address)
}

/// Carry a 128-bit half as one field element.
pub fn felt_from_u128(value: u128) -> Felt {
    Felt::new(U256::from(value)).unwrap_or_else(|_| unreachable!("u128 fits below the field prime"))
}

/// Sentinel maximum allowance approved once per token to amortize future
/// approvals: `2^250 - 1`.
pub fn max_allowance() -> U256 {
    (U256::one() << 250) - 1
}
