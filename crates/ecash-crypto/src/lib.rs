//! # ecash-crypto
//!
//! Cryptographic primitives for the Cashu blind-signature e-cash protocol.
//!
//! Curve arithmetic is consumed from `secp256k1`; this crate only specifies how
//! it is used. Every function here is pure and synchronous, and randomness is
//! always supplied by the caller.
//!
//! ## Modules
//!
//! - [`adaptor`] — Schnorr adaptor signatures and key tweaks for atomic swaps
//! - [`keys`] — Opaque secp256k1 public/secret key wrappers
//! - [`hash_to_curve`] — Domain-separated map from bytes to a curve point
//! - [`dhke`] — Blind Diffie-Hellman key exchange (blind, sign, unblind, verify)
//! - [`dleq`] — Discrete-log equality proofs binding a blind signature to a mint key
//! - [`schnorr`] — BIP-340 Schnorr signatures over SHA-256 digests

pub mod adaptor;
pub mod dhke;
pub mod dleq;
pub mod hash_to_curve;
pub mod keys;
pub mod schnorr;

pub use keys::{PublicKey, SecretKey};

/// Error types for cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Point is not on the curve, or an operation produced the identity.
    #[error("invalid curve point")]
    InvalidPoint,

    /// Scalar is zero or not below the curve order.
    #[error("invalid scalar")]
    InvalidScalar,

    /// No valid point was found within the hash-to-curve attempt bound.
    #[error("hash_to_curve exhausted {0} attempts")]
    HashToCurveExhausted(u32),

    /// Signature bytes are structurally invalid.
    #[error("invalid signature encoding")]
    InvalidSignature,

    /// A revealed signature was not decrypted from the given encrypted
    /// signature and adaptor point.
    #[error("signature does not match the encrypted signature")]
    AdaptorMismatch,

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Hex decoding failed.
    #[error("hex decode error: {0}")]
    Hex(String),
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        Self::Hex(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
