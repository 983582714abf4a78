//! Keyset identifiers.
//!
//! `id = 0x00 || SHA-256(K_a1 || K_a2 || ...)[0..7]` where the compressed
//! public keys are concatenated in ascending amount order.

use std::fmt;
use std::str::FromStr;

use ecash_crypto::PublicKey;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sha2::{Digest, Sha256};

use crate::{Amount, Result, TypesError};

/// Length of a keyset id in bytes.
pub const KEYSET_ID_LEN: usize = 8;

/// Version byte of ids derived by [`KeysetId::from_keys`].
pub const VERSION_00: u8 = 0x00;

/// An 8-byte keyset identifier, hex on the wire.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeysetId(#[serde_as(as = "Hex")] [u8; KEYSET_ID_LEN]);

impl KeysetId {
    /// Derive a version-`00` id from a keyset's public keys.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = (Amount, &'a PublicKey)>) -> Self {
        let mut keys: Vec<_> = keys.into_iter().collect();
        keys.sort_by_key(|(amount, _)| *amount);

        let mut hasher = Sha256::new();
        for (_, key) in keys {
            hasher.update(key.to_bytes());
        }
        let digest = hasher.finalize();

        let mut id = [0u8; KEYSET_ID_LEN];
        id[0] = VERSION_00;
        id[1..].copy_from_slice(&digest[..KEYSET_ID_LEN - 1]);
        Self(id)
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; KEYSET_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn to_bytes(&self) -> [u8; KEYSET_ID_LEN] {
        self.0
    }

    /// Leading version byte.
    pub fn version(&self) -> u8 {
        self.0[0]
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 16 hex characters.
    ///
    /// # Errors
    ///
    /// - [`TypesError::InvalidKeysetId`] if the input is not 8 hex-encoded bytes
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut id = [0u8; KEYSET_ID_LEN];
        hex::decode_to_slice(s, &mut id).map_err(|e| TypesError::InvalidKeysetId(format!("{s}: {e}")))?;
        Ok(Self(id))
    }
}

impl fmt::Display for KeysetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for KeysetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeysetId({})", self.to_hex())
    }
}

impl FromStr for KeysetId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}
