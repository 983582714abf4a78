//! Discrete-log equality proofs for blind signatures.
//!
//! A mint with key pair `(k, K = kG)` returning `C_ = k B_` proves that the
//! same `k` was used in both relations, so a wallet can detect a mint that
//! signs with a key other than the one it advertises.
//!
//! ```text
//! prove:   R1 = pG, R2 = pB_, e = hash_e(R1, R2, K, C_), s = p + e k
//! verify:  R1 = sG - eK, R2 = sB_ - eC_, accept iff e == hash_e(R1, R2, K, C_)
//! ```

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sha2::{Digest, Sha256};

use crate::hash_to_curve::hash_to_curve;
use crate::keys::{PublicKey, SecretKey};
use crate::Result;

/// A DLEQ proof `(e, s)` as two big-endian 32-byte scalars.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DleqProof {
    /// Challenge.
    #[serde_as(as = "Hex")]
    pub e: [u8; 32],
    /// Response.
    #[serde_as(as = "Hex")]
    pub s: [u8; 32],
}

/// Challenge hash over a sequence of points.
///
/// Each point contributes the lowercase hex of its 65-byte uncompressed
/// encoding, and SHA-256 is taken over the concatenated ASCII.
pub fn hash_e(points: &[&PublicKey]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for point in points {
        hasher.update(hex::encode(point.to_uncompressed_bytes()).as_bytes());
    }
    hasher.finalize().into()
}

/// Prove that `signed = k * blinded` for the key behind `k.public_key()`.
///
/// # Errors
///
/// - [`crate::CryptoError::InvalidScalar`] if the challenge falls outside the
///   scalar field (probability ~2^-128)
pub fn generate<R: RngCore + CryptoRng>(
    k: &SecretKey,
    blinded: &PublicKey,
    signed: &PublicKey,
    rng: &mut R,
) -> Result<DleqProof> {
    let nonce = SecretKey::random(rng);
    generate_with_nonce(k, blinded, signed, &nonce)
}

/// [`generate`] with a caller-chosen nonce. The nonce must never be reused.
pub fn generate_with_nonce(
    k: &SecretKey,
    blinded: &PublicKey,
    signed: &PublicKey,
    nonce: &SecretKey,
) -> Result<DleqProof> {
    let r1 = nonce.public_key();
    let r2 = blinded.mul(nonce)?;
    let mint_pubkey = k.public_key();

    let e = hash_e(&[&r1, &r2, &mint_pubkey, signed]);
    let e_scalar = SecretKey::from_slice(&e)?;
    let s = nonce.add(&k.mul(&e_scalar)?)?;

    Ok(DleqProof { e, s: s.to_bytes() })
}

/// Verify a proof against the blinded pair `(B_, C_)`.
///
/// Returns `Ok(false)` for any proof that does not check out, including
/// scalars outside `[1, n)`.
pub fn verify_blind(
    proof: &DleqProof,
    mint_pubkey: &PublicKey,
    blinded: &PublicKey,
    signed: &PublicKey,
) -> Result<bool> {
    let (Ok(e), Ok(s)) = (
        SecretKey::from_slice(&proof.e),
        SecretKey::from_slice(&proof.s),
    ) else {
        return Ok(false);
    };

    let Ok(r1) = s.public_key().sub(&mint_pubkey.mul(&e)?) else {
        return Ok(false);
    };
    let Ok(r2) = blinded.mul(&s)?.sub(&signed.mul(&e)?) else {
        return Ok(false);
    };

    Ok(hash_e(&[&r1, &r2, mint_pubkey, signed]) == proof.e)
}

/// Verify a proof carried on an unblinded proof.
///
/// The holder reveals the blinding factor `r`, so any third party can
/// rebuild `B_ = Y + rG` and `C_ = C + rK` and check the original proof.
pub fn verify_unblinded(
    proof: &DleqProof,
    blinding_factor: &SecretKey,
    mint_pubkey: &PublicKey,
    secret: &[u8],
    unblinded: &PublicKey,
) -> Result<bool> {
    let y = hash_to_curve(secret)?;
    let Ok(blinded) = y.add(&blinding_factor.public_key()) else {
        return Ok(false);
    };
    let Ok(signed) = unblinded.add(&mint_pubkey.mul(blinding_factor)?) else {
        return Ok(false);
    };
    verify_blind(proof, mint_pubkey, &blinded, &signed)
}
