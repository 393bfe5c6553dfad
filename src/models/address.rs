use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account or contract address in `0x`-prefixed hex form.
///
/// Stored lowercased so that comparisons ignore checksum casing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid address: {0}")]
pub struct InvalidAddress(pub String);

impl Address {
    pub fn zero() -> Self {
        Address(format!("0x{}", "0".repeat(40)))
    }

    /// For compile-time constants that are known to be well formed.
    pub(crate) fn new_unchecked(hex: &str) -> Self {
        Address(hex.to_ascii_lowercase())
    }

    pub fn is_zero(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd`
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl TryFrom<String> for Address {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or_else(|| InvalidAddress(value.clone()))?;
        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidAddress(value));
        }
        Ok(Address(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl std::str::FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::try_from(s.to_owned())
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
