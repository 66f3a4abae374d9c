//! Key types for custody parties and storage locations
//!
//! Identities (who acts) and addresses (where funds and records live) are both
//! 32-byte keys. They are kept as distinct types so a party's identity is never
//! passed where a record address is expected. Both render as base58, the way
//! ledger platforms print public keys.

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::KeyError;

/// Length in bytes of every key in the ledger.
pub const KEY_LEN: usize = 32;

fn decode_key(s: &str) -> Result<[u8; KEY_LEN], KeyError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|_| KeyError::InvalidBase58(s.to_string()))?;
    <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| KeyError::InvalidLength {
        expected: KEY_LEN,
        actual: bytes.len(),
    })
}

/// Identity of a party (the public half of an Ed25519 keypair).
///
/// The owner of a custody record, a depositor, or any other caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; KEY_LEN]);

impl Identity {
    /// Create a fresh identity that has never been seen before.
    ///
    /// Hashes a UUID v7 so consecutive identities share no visible prefix.
    pub fn new_unique() -> Self {
        let digest = Sha256::digest(Uuid::now_v7().as_bytes());
        Self(digest.into())
    }

    /// Create from raw key bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from an Ed25519 verifying key
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// The wallet address holding this party's funds
    pub fn wallet(&self) -> Address {
        Address(self.0)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new_unique()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl FromStr for Identity {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_key(s).map(Self)
    }
}

impl TryFrom<String> for Identity {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.to_string()
    }
}

/// Storage location in the ledger.
///
/// Either a party's wallet or a program-derived custody record address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; KEY_LEN]);

impl Address {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl From<Identity> for Address {
    fn from(id: Identity) -> Self {
        id.wallet()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_key(s).map(Self)
    }
}

impl TryFrom<String> for Address {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}
