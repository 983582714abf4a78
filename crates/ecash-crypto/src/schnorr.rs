//! BIP-340 Schnorr signatures over SHA-256 message digests.
//!
//! The signed value is always `SHA-256(message)` and the verifying key is the
//! x-only form of the signer's point, whatever parity the compressed key
//! carries. Used for P2PK witnesses.

use secp256k1::{schnorr, Keypair, Message, SECP256K1};
use sha2::{Digest, Sha256};

use crate::keys::{PublicKey, SecretKey};
use crate::{CryptoError, Result};

/// Length of a BIP-340 signature.
pub const SIGNATURE_LEN: usize = 64;

/// A 64-byte BIP-340 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    inner: schnorr::Signature,
}

impl Signature {
    /// Parse a 64-byte signature.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignature);
        }
        let inner = schnorr::Signature::from_slice(bytes).map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self { inner })
    }

    /// Parse a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidSignature)?;
        Self::from_slice(&bytes)
    }

    /// Raw 64 bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.inner.serialize()
    }

    /// Lowercase hex of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// SHA-256 of `message`, the value actually signed.
pub fn message_digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

/// Sign `SHA-256(message)` with `key`.
///
/// `aux_rand` is the BIP-340 auxiliary randomness; callers should draw it
/// from a CSPRNG. A fixed value yields deterministic signatures.
pub fn sign_message(key: &SecretKey, message: &[u8], aux_rand: &[u8; 32]) -> Signature {
    let keypair = Keypair::from_secret_key(SECP256K1, key.inner());
    let msg = Message::from_digest(message_digest(message));
    Signature {
        inner: SECP256K1.sign_schnorr_with_aux_rand(&msg, &keypair, aux_rand),
    }
}

/// Verify a signature on `SHA-256(message)` against the x-only form of `key`.
pub fn verify_message(key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let msg = Message::from_digest(message_digest(message));
    SECP256K1
        .verify_schnorr(&signature.inner, &msg, &key.x_only())
        .is_ok()
}
