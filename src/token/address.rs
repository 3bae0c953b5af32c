//! Account identifiers for the ledger
//!
//! An address is a 20-byte identifier rendered as `0x`-prefixed hex.
//! The all-zero address is the "no account" sentinel.

use crate::crypto::sha256;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// Address parsing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Invalid address hex: {0}")]
    InvalidHex(String),
    #[error("Empty address label")]
    EmptyLabel,
}

/// A ledger account identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The zero address ("no account")
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Derive a deterministic address from a human-readable label
    ///
    /// Takes the first 20 bytes of SHA-256(label), so `from_label("bob")`
    /// is the same account everywhere.
    pub fn from_label(label: &str) -> Self {
        let hash = sha256(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash[..ADDRESS_LEN]);
        Self(bytes)
    }

    /// Parse hex, or derive from a label when prefixed with `@` ("@bob")
    pub fn parse_account(input: &str) -> Result<Self, AddressError> {
        match input.trim().strip_prefix('@').map(str::trim) {
            Some("") => Err(AddressError::EmptyLabel),
            Some(label) => Ok(Self::from_label(label)),
            None => input.parse(),
        }
    }

    /// Generate a random non-zero address
    pub fn random() -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        loop {
            rand::thread_rng().fill_bytes(&mut bytes);
            if bytes != [0u8; ADDRESS_LEN] {
                return Self(bytes);
            }
        }
    }

    /// Check for the zero address
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }

        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(
            Address::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn test_from_label_is_deterministic() {
        let bob = Address::from_label("bob");
        assert_eq!(bob, Address::from_label("bob"));
        assert_ne!(bob, Address::from_label("alice"));
        assert!(!bob.is_zero());

        // First 20 bytes of sha256("hello world")
        assert_eq!(
            Address::from_label("hello world").to_hex(),
            "0xb94d27b9934d3e08a52e52d7da7dabfac484efe3"
        );
    }

    #[test]
    fn test_parse() {
        let addr = Address::from_label("alice");
        let hex = addr.to_hex();

        assert_eq!(hex.parse::<Address>().unwrap(), addr);
        assert_eq!(hex[2..].parse::<Address>().unwrap(), addr);
        let upper = format!("0x{}", hex[2..].to_uppercase());
        assert_eq!(upper.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "0x1234".parse::<Address>(),
            Err(AddressError::InvalidLength(2))
        );
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_parse_account() {
        assert_eq!(
            Address::parse_account("@bob").unwrap(),
            Address::from_label("bob")
        );
        let hex = Address::from_label("bob").to_hex();
        assert_eq!(
            Address::parse_account(&hex).unwrap(),
            Address::from_label("bob")
        );
        assert!(Address::parse_account("bob").is_err());
    }

    #[test]
    fn test_parse_account_rejects_empty_label() {
        assert_eq!(Address::parse_account("@"), Err(AddressError::EmptyLabel));
        assert_eq!(Address::parse_account("  @  "), Err(AddressError::EmptyLabel));
        assert_eq!(
            Address::parse_account(" @bob "),
            Ok(Address::from_label("bob"))
        );
    }

    #[test]
    fn test_random_is_nonzero() {
        let a = Address::random();
        let b = Address::random();
        assert!(!a.is_zero());
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Address::from_label("bob"), 5u128);

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains(&Address::from_label("bob").to_hex()));

        let back: HashMap<Address, u128> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
