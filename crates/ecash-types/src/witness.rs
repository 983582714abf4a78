//! Signature witnesses.

use ecash_crypto::schnorr::Signature;
use serde::{Deserialize, Serialize};

/// Signatures unlocking a P2PK proof.
///
/// Signatures are kept as the hex strings received. One that does not decode
/// to 64 bytes simply never matches a key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    /// Hex-encoded BIP-340 signatures.
    #[serde(default)]
    pub signatures: Vec<String>,
}

impl Witness {
    /// Witness from hex-encoded signatures.
    pub fn new(signatures: Vec<String>) -> Self {
        Self { signatures }
    }

    /// Append a signature.
    pub fn push(&mut self, signature: &Signature) {
        self.signatures.push(signature.to_hex());
    }

    /// True when no signatures are present.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl From<Vec<Signature>> for Witness {
    fn from(signatures: Vec<Signature>) -> Self {
        Self {
            signatures: signatures.iter().map(Signature::to_hex).collect(),
        }
    }
}
