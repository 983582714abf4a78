//! # ecash-types
//!
//! Wire and data-model types shared by the ecash workspace.
//!
//! Every type here round-trips through the JSON shapes other wallets and mints
//! exchange. Secrets in particular are stored verbatim: the bytes a proof was
//! signed over are the bytes it is verified against.
//!
//! ## Modules
//!
//! - [`secret`] — Opaque proof secrets and the strict P2PK parser
//! - [`conditions`] — P2PK spending conditions and tags
//! - [`witness`] — Signature witnesses attached to proofs
//! - [`proof`] — Proofs, blinded messages and blind signatures
//! - [`keyset_id`] — Keyset identifiers

pub mod conditions;
pub mod keyset_id;
pub mod proof;
pub mod secret;
pub mod witness;

pub use conditions::{SigFlag, SpendingConditions};
pub use keyset_id::KeysetId;
pub use proof::{BlindSignature, BlindedMessage, Proof, ProofDleq};
pub use secret::{ParsedSecret, Secret, SecretKind};
pub use witness::Witness;

/// Token amount in the keyset's base unit.
pub type Amount = u64;

/// Error types for parsing and building wire types.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// A secret that claims to be structured does not parse, or carries
    /// malformed known tags.
    #[error("malformed secret: {0}")]
    MalformedSecret(String),

    /// Keyset id is not 8 hex-encoded bytes.
    #[error("invalid keyset id: {0}")]
    InvalidKeysetId(String),

    /// Key or signature material failed to parse.
    #[error("crypto error: {0}")]
    Crypto(#[from] ecash_crypto::CryptoError),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for type-level operations.
pub type Result<T> = std::result::Result<T, TypesError>;
