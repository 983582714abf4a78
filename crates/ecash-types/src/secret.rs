//! Proof secrets.
//!
//! A [`Secret`] is the exact string a wallet chose when it blinded a token.
//! Hash-to-curve and P2PK signatures are both computed over its raw bytes, so
//! it is never normalised, reformatted or re-encoded after it is received.

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conditions::SpendingConditions;
use crate::Result;

/// Kind tag heading a pay-to-public-key secret.
pub const P2PK_KIND: &str = "P2PK";

/// An opaque proof secret, held verbatim.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

/// Shallow classification of a secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretKind {
    /// Anything that is not a P2PK well-known secret.
    Plain,
    /// A JSON array headed by `"P2PK"`.
    P2pk,
}

/// Result of strictly parsing a secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedSecret {
    /// Spendable by anyone who knows the secret.
    Plain,
    /// Locked to one or more public keys.
    P2pk(SpendingConditions),
}

impl Secret {
    /// Wrap an existing secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Generate a plain secret: hex of 32 random bytes.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// The secret as received.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The exact bytes that are hashed and signed.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consume into the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Classify without validating the P2PK body.
    ///
    /// Any JSON array whose first element is the string `"P2PK"` is
    /// [`SecretKind::P2pk`]; everything else is [`SecretKind::Plain`].
    pub fn kind(&self) -> SecretKind {
        match serde_json::from_str::<Value>(&self.0) {
            Ok(Value::Array(items)) if items.first().and_then(Value::as_str) == Some(P2PK_KIND) => {
                SecretKind::P2pk
            }
            _ => SecretKind::Plain,
        }
    }

    /// Classify and, for P2PK secrets, parse the spending conditions strictly.
    ///
    /// # Errors
    ///
    /// - [`crate::TypesError::MalformedSecret`] if the secret is headed by
    ///   `"P2PK"` but its body or tags do not parse
    pub fn parse(&self) -> Result<ParsedSecret> {
        match self.kind() {
            SecretKind::Plain => Ok(ParsedSecret::Plain),
            SecretKind::P2pk => SpendingConditions::from_secret_str(&self.0).map(ParsedSecret::P2pk),
        }
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}
