//! Cryptographic utilities
//!
//! SHA-256 hashing used to derive deterministic account addresses.

pub mod hash;

pub use hash::{sha256, sha256_hex};
