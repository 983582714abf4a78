//! Proofs and the blind-signature exchange messages.

use ecash_crypto::dleq::DleqProof;
use ecash_crypto::hash_to_curve::hash_to_curve;
use ecash_crypto::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::{Amount, KeysetId, Result, Secret, Witness};

/// Wallet to mint: a blinded secret to be signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedMessage {
    /// Requested amount.
    pub amount: Amount,
    /// Keyset to sign with.
    pub id: KeysetId,
    /// `B_ = Y + rG`.
    #[serde(rename = "B_")]
    pub blinded_secret: PublicKey,
}

/// Mint to wallet: a blinded signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindSignature {
    /// Signed amount.
    pub amount: Amount,
    /// Keyset that signed.
    pub id: KeysetId,
    /// `C_ = k B_`.
    #[serde(rename = "C_")]
    pub c: PublicKey,
    /// Proof that `C_` was made with the advertised key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dleq: Option<DleqProof>,
}

/// DLEQ proof carried on an unblinded proof, including the blinding factor
/// so any holder can re-check it.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofDleq {
    /// Challenge.
    #[serde_as(as = "Hex")]
    pub e: [u8; 32],
    /// Response.
    #[serde_as(as = "Hex")]
    pub s: [u8; 32],
    /// Blinding factor `r`.
    #[serde_as(as = "Hex")]
    pub r: [u8; 32],
}

impl ProofDleq {
    /// Attach the blinding factor to a mint-issued proof.
    pub fn new(proof: &DleqProof, blinding_factor: &SecretKey) -> Self {
        Self {
            e: proof.e,
            s: proof.s,
            r: blinding_factor.to_bytes(),
        }
    }

    /// The `(e, s)` pair.
    pub fn proof(&self) -> DleqProof {
        DleqProof {
            e: self.e,
            s: self.s,
        }
    }

    /// The blinding factor as a scalar.
    ///
    /// # Errors
    ///
    /// - [`crate::TypesError::Crypto`] if `r` is zero or out of range
    pub fn blinding_factor(&self) -> Result<SecretKey> {
        Ok(SecretKey::from_slice(&self.r)?)
    }
}

/// An unblinded token: a secret and the mint's signature on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Amount, selecting the signing key within the keyset.
    pub amount: Amount,
    /// Keyset that signed.
    pub id: KeysetId,
    /// The secret, verbatim.
    pub secret: Secret,
    /// `C = k Y`.
    #[serde(rename = "C")]
    pub c: PublicKey,
    /// Spending witness. A JSON string on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "witness_json")]
    pub witness: Option<Witness>,
    /// Mint's DLEQ proof with the blinding factor, if the wallet kept it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dleq: Option<ProofDleq>,
}

impl Proof {
    /// `Y = hash_to_curve(secret)`, the point the mint signed.
    pub fn y(&self) -> Result<PublicKey> {
        Ok(hash_to_curve(self.secret.as_bytes())?)
    }
}

/// Witnesses travel as JSON-encoded strings. Inline objects are accepted on
/// input.
mod witness_json {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    use crate::Witness;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Text(String),
        Inline(Witness),
    }

    pub fn serialize<S: Serializer>(witness: &Option<Witness>, serializer: S) -> Result<S::Ok, S::Error> {
        match witness {
            Some(witness) => {
                let text = serde_json::to_string(witness).map_err(ser::Error::custom)?;
                serializer.serialize_some(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Witness>, D::Error> {
        match Option::<Encoded>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Encoded::Inline(witness)) => Ok(Some(witness)),
            Some(Encoded::Text(text)) => serde_json::from_str(&text).map(Some).map_err(de::Error::custom),
        }
    }
}
