//! # ecash-mint
//!
//! Blind-signature issuance and proof acceptance for a Cashu mint.
//!
//! Tokens are issued through BDHKE over secp256k1 so that the mint never
//! learns which secret it signed. A proof is accepted when its signature
//! matches the keyset key for its amount and, for P2PK secrets, when enough
//! listed keys have signed the secret.
//!
//! Nothing here tracks spent proofs; double-spend detection belongs to the
//! caller's storage layer.
//!
//! ## Modules
//!
//! - [`keyset`] — Mint key pairs per amount and the keyset registry
//! - [`bdhke_mint`] — Wallet and mint sides of blind issuance
//! - [`p2pk`] — Pay-to-public-key witness verification
//! - [`accept`] — Full proof acceptance
//! - [`config`] — TOML configuration

pub mod accept;
pub mod bdhke_mint;
pub mod config;
pub mod keyset;
pub mod p2pk;

use ecash_crypto::CryptoError;
use ecash_types::{Amount, KeysetId, TypesError};

/// Error types for mint operations.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// A cryptographic primitive failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A P2PK secret does not parse.
    #[error("malformed secret: {0}")]
    MalformedSecret(String),

    /// The threshold exceeds the number of distinct eligible keys.
    #[error("unsatisfiable condition: {required} signatures required, {available} keys eligible")]
    UnsatisfiableCondition {
        /// Signatures required.
        required: u64,
        /// Distinct keys that could sign.
        available: usize,
    },

    /// A P2PK proof was presented without a witness.
    #[error("missing witness")]
    MissingWitness,

    /// Signature scope other than `SIG_INPUTS`.
    #[error("unsupported sigflag: {0}")]
    UnsupportedSigflag(String),

    /// No keyset with this id.
    #[error("unknown keyset {0}")]
    UnknownKeyset(KeysetId),

    /// Keyset has no key for this amount.
    #[error("keyset {id} has no key for amount {amount}")]
    UnknownAmount {
        /// The keyset.
        id: KeysetId,
        /// The requested amount.
        amount: Amount,
    },

    /// Keyset no longer signs new outputs.
    #[error("keyset {0} is inactive")]
    InactiveKeyset(KeysetId),

    /// A blind signature's DLEQ proof does not verify.
    #[error("DLEQ proof verification failed")]
    InvalidDleq,

    /// Configuration could not be read or is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl From<TypesError> for MintError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::MalformedSecret(reason) => Self::MalformedSecret(reason),
            TypesError::Crypto(e) => Self::Crypto(e),
            TypesError::Json(e) => Self::MalformedSecret(e.to_string()),
            TypesError::InvalidKeysetId(reason) => Self::Config(format!("invalid keyset id: {reason}")),
        }
    }
}

/// Convenience result type for mint operations.
pub type Result<T> = std::result::Result<T, MintError>;
