//! # Decimal Amounts
//!
//! Human-facing token amounts as exact, normalized decimal strings.
//!
//! Chain-side arithmetic happens on `U256` base units; this type only
//! carries the text representation without precision loss, so a value that
//! round-trips through the unit converter compares equal to its source.

use crate::errors::AmountError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// An exact decimal amount, normalized on construction.
///
/// Normalization strips leading zeros from the integer part, trailing zeros
/// from the fractional part, and the decimal point when the fraction is
/// empty. `"007.500"` and `"7.5"` construct equal values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DecimalAmount(String);

impl DecimalAmount {
    /// Parse and normalize a decimal string.
    pub fn new(text: &str) -> Result<Self, AmountError> {
        let trimmed = text.trim();
        let malformed = || AmountError::Malformed(text.to_string());

        let (int_raw, frac_raw) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };
        if int_raw.is_empty() && frac_raw.is_empty() {
            return Err(malformed());
        }
        if !int_raw.bytes().all(|b| b.is_ascii_digit())
            || !frac_raw.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let int_part = int_raw.trim_start_matches('0');
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let frac_part = frac_raw.trim_end_matches('0');

        let normalized = if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac_part}")
        };
        Ok(Self(normalized))
    }

    /// The normalized decimal text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer and fractional digit runs (fraction may be empty).
    pub fn parts(&self) -> (&str, &str) {
        match self.0.split_once('.') {
            Some((i, f)) => (i, f),
            None => (self.0.as_str(), ""),
        }
    }

    /// Number of fractional digits after normalization.
    pub fn fractional_digits(&self) -> u32 {
        self.parts().1.len() as u32
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DecimalAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for DecimalAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::new(&text).map_err(serde::de::Error::custom)
    }
}
