//! secp256k1 key wrappers.
//!
//! [`PublicKey`] and [`SecretKey`] are the only curve types the rest of the
//! workspace sees. They expose a small fixed capability set (hex encoding,
//! point addition, scalar multiplication, negation, x-only view) so callers
//! never depend on `secp256k1` directly.
//!
//! Invariants enforced at construction:
//! - a `PublicKey` is always on the curve and never the identity;
//! - a `SecretKey` is always in `[1, n)`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rand_core::{CryptoRng, RngCore};
use secp256k1::{Parity, Scalar, XOnlyPublicKey, SECP256K1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::{CryptoError, Result};

/// Length of a compressed SEC1 public key.
pub const PUBLIC_KEY_LEN: usize = 33;

/// Length of a BIP-340 x-only public key.
pub const X_ONLY_KEY_LEN: usize = 32;

/// Length of a secret scalar.
pub const SECRET_KEY_LEN: usize = 32;

/// A secp256k1 point in compressed form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    inner: secp256k1::PublicKey,
}

/// A secp256k1 secret scalar.
pub struct SecretKey {
    inner: secp256k1::SecretKey,
}

impl PublicKey {
    /// Parse a 33-byte compressed point.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let inner =
            secp256k1::PublicKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPoint)?;
        Ok(Self { inner })
    }

    /// Lift a 32-byte x-only key to the point with even y.
    pub fn from_x_only(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != X_ONLY_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: X_ONLY_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let xonly = XOnlyPublicKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPoint)?;
        Ok(Self {
            inner: xonly.public_key(Parity::Even),
        })
    }

    /// Parse either a compressed (33-byte) or x-only (32-byte) key.
    ///
    /// Signer keys inside spending conditions appear in both forms on the wire.
    pub fn from_signer_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            X_ONLY_KEY_LEN => Self::from_x_only(bytes),
            _ => Self::from_slice(bytes),
        }
    }

    /// Parse a hex-encoded compressed point.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_slice(&hex::decode(s)?)
    }

    /// Compressed SEC1 encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.inner.serialize()
    }

    /// Uncompressed SEC1 encoding (`0x04 || x || y`).
    pub fn to_uncompressed_bytes(&self) -> [u8; 65] {
        self.inner.serialize_uncompressed()
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The BIP-340 x-only view of this point.
    pub fn x_only(&self) -> XOnlyPublicKey {
        self.inner.x_only_public_key().0
    }

    /// Whether the compressed encoding carries the odd-y prefix `0x03`.
    pub fn has_odd_y(&self) -> bool {
        self.inner.x_only_public_key().1 == Parity::Odd
    }

    /// `self + other`. Fails if the sum is the identity.
    pub fn add(&self, other: &PublicKey) -> Result<PublicKey> {
        let inner = self
            .inner
            .combine(&other.inner)
            .map_err(|_| CryptoError::InvalidPoint)?;
        Ok(Self { inner })
    }

    /// `self - other`. Fails if the difference is the identity.
    pub fn sub(&self, other: &PublicKey) -> Result<PublicKey> {
        self.add(&other.negate())
    }

    /// `-self`.
    pub fn negate(&self) -> PublicKey {
        Self {
            inner: self.inner.negate(SECP256K1),
        }
    }

    /// `k * self`.
    pub fn mul(&self, k: &SecretKey) -> Result<PublicKey> {
        let inner = self
            .inner
            .mul_tweak(SECP256K1, &k.as_scalar())
            .map_err(|_| CryptoError::InvalidPoint)?;
        Ok(Self { inner })
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(inner: secp256k1::PublicKey) -> Self {
        Self { inner }
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl SecretKey {
    /// Parse a 32-byte big-endian scalar. Zero and values `>= n` are rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: SECRET_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let inner =
            secp256k1::SecretKey::from_slice(bytes).map_err(|_| CryptoError::InvalidScalar)?;
        Ok(Self { inner })
    }

    /// Parse a hex-encoded scalar.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = hex::decode(s)?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Sample a uniformly random non-zero scalar.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SECRET_KEY_LEN];
        loop {
            rng.fill_bytes(&mut bytes);
            if let Ok(inner) = secp256k1::SecretKey::from_slice(&bytes) {
                bytes.zeroize();
                return Self { inner };
            }
        }
    }

    /// `self * G`.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.public_key(SECP256K1),
        }
    }

    /// Big-endian scalar bytes.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LEN] {
        self.inner.secret_bytes()
    }

    /// Lowercase hex of the scalar.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// `self * other mod n`. Fails only if the product is zero.
    pub fn mul(&self, other: &SecretKey) -> Result<SecretKey> {
        let inner = self
            .inner
            .mul_tweak(&other.as_scalar())
            .map_err(|_| CryptoError::InvalidScalar)?;
        Ok(Self { inner })
    }

    /// `self + other mod n`. Fails if the sum is zero.
    pub fn add(&self, other: &SecretKey) -> Result<SecretKey> {
        let inner = self
            .inner
            .add_tweak(&other.as_scalar())
            .map_err(|_| CryptoError::InvalidScalar)?;
        Ok(Self { inner })
    }

    /// `self - other mod n`. Fails if the difference is zero.
    pub fn sub(&self, other: &SecretKey) -> Result<SecretKey> {
        self.add(&other.negate())
    }

    /// `-self mod n`.
    pub fn negate(&self) -> SecretKey {
        Self {
            inner: self.inner.negate(),
        }
    }

    pub(crate) fn as_scalar(&self) -> Scalar {
        Scalar::from(self.inner)
    }

    pub(crate) fn inner(&self) -> &secp256k1::SecretKey {
        &self.inner
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        Self { inner: self.inner }
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for SecretKey {}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.inner.non_secure_erase();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl FromStr for SecretKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}
