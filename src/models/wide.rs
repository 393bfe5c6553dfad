use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// An unsigned integer as the contract bridge reports it: up to 256 bits wide,
/// carried as a JSON number, a decimal string or a `0x` hex string.
///
/// Nothing is interpreted until [`WideUint::to_u64`] is called.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WideUint {
    Number(u64),
    /// A JSON number outside `u64`: too large, negative or fractional.
    OutOfRange(Number),
    Text(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WideUintError {
    #[error("{0} does not fit in u64")]
    Overflow(String),
    #[error("{0} is not an unsigned integer")]
    Malformed(String),
}

impl WideUint {
    pub fn to_u64(&self) -> Result<u64, WideUintError> {
        match self {
            WideUint::Number(value) => Ok(*value),
            WideUint::OutOfRange(number) => classify_number(number),
            WideUint::Text(text) => parse_text(text.trim()),
        }
    }
}

fn classify_number(number: &Number) -> Result<u64, WideUintError> {
    if let Some(value) = number.as_u64() {
        return Ok(value);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => {
            Err(WideUintError::Overflow(number.to_string()))
        }
        _ => Err(WideUintError::Malformed(number.to_string())),
    }
}

fn parse_text(text: &str) -> Result<u64, WideUintError> {
    let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    if digits.is_empty() {
        return Err(WideUintError::Malformed(text.to_owned()));
    }

    let mut value: u64 = 0;
    for c in digits.chars() {
        let digit = c
            .to_digit(radix)
            .ok_or_else(|| WideUintError::Malformed(text.to_owned()))?;
        value = value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or_else(|| WideUintError::Overflow(text.to_owned()))?;
    }
    Ok(value)
}

impl From<u64> for WideUint {
    fn from(value: u64) -> Self {
        WideUint::Number(value)
    }
}

impl fmt::Display for WideUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WideUint::Number(value) => write!(f, "{}", value),
            WideUint::OutOfRange(number) => write!(f, "{}", number),
            WideUint::Text(text) => f.write_str(text),
        }
    }
}
