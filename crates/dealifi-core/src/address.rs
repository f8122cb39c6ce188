//! Solana address type.
//!
//! Every merchant wallet, candy machine, collection and mint is identified by a
//! base58-encoded 32-byte public key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a Solana public key in bytes.
pub const ADDRESS_LEN: usize = 32;

/// A base58-encoded Solana public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress([u8; ADDRESS_LEN]);

impl WalletAddress {
    /// Create an address from raw key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Return the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Encode the address as base58.
    #[must_use]
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

/// Errors produced while parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The string is empty.
    #[error("address is empty")]
    Empty,

    /// The string is not valid base58.
    #[error("address is not valid base58")]
    InvalidBase58,

    /// The decoded key has the wrong length.
    #[error("address must decode to {ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for WalletAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| AddressError::InvalidBase58)?;

        let key: [u8; ADDRESS_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;

        Ok(Self(key))
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({})", self.to_base58())
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WalletAddress> for String {
    fn from(address: WalletAddress) -> Self {
        address.to_base58()
    }
}

impl AsRef<[u8]> for WalletAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
    const PROGRAM_ID: &str = "3HjM15FLHaRkPmTGhovcdNKu4mv9q6vpvDBeHM4SpvZA";

    #[test]
    fn parses_system_program() {
        let address: WalletAddress = SYSTEM_PROGRAM.parse().unwrap();
        assert_eq!(address.as_bytes(), &[0u8; 32]);
        assert_eq!(address.to_string(), SYSTEM_PROGRAM);
    }

    #[test]
    fn display_matches_input() {
        let address: WalletAddress = PROGRAM_ID.parse().unwrap();
        assert_eq!(address.to_string(), PROGRAM_ID);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!("  ".parse::<WalletAddress>(), Err(AddressError::Empty));
    }

    #[test]
    fn rejects_non_base58() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet
        assert_eq!(
            "0OIl".parse::<WalletAddress>(),
            Err(AddressError::InvalidBase58)
        );
    }

    #[test]
    fn rejects_short_keys() {
        assert!(matches!(
            "abc".parse::<WalletAddress>(),
            Err(AddressError::InvalidLength(_))
        ));
    }

    #[test]
    fn serde_as_string() {
        let address: WalletAddress = PROGRAM_ID.parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{PROGRAM_ID}\""));

        let back: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<WalletAddress, _> = serde_json::from_str("\"not-an-address\"");
        assert!(result.is_err());
    }
}
