//! Blind Diffie-Hellman key exchange (BDHKE).
//!
//! ## Protocol Flow
//!
//! 1. Holder: `blind(secret)` -> `(B_ = Y + rG, r)` where `Y = hash_to_curve(secret)`
//! 2. Mint: `sign(k, B_)` -> `(C_ = k B_, DLEQ proof)`
//! 3. Holder: `unblind(C_, r, K)` -> `C = C_ - rK = kY`
//! 4. Mint, at redemption: `verify(k, C, secret)` checks `C == kY`
//!
//! Matching keyset id and amount between steps 1 and 2 is a caller
//! precondition and is not checked here.

use rand_core::{CryptoRng, RngCore};

use crate::dleq::{self, DleqProof};
use crate::hash_to_curve::hash_to_curve;
use crate::keys::{PublicKey, SecretKey};
use crate::Result;

/// Blind `secret` with a fresh random factor.
///
/// Returns `(B_, r)`. The holder keeps `r` private and must not reuse it
/// across secrets.
///
/// # Errors
///
/// - [`crate::CryptoError::InvalidPoint`] if `Y + rG` is the identity
/// - [`crate::CryptoError::HashToCurveExhausted`] from `hash_to_curve`
pub fn blind<R: RngCore + CryptoRng>(
    secret: &[u8],
    rng: &mut R,
) -> Result<(PublicKey, SecretKey)> {
    let r = SecretKey::random(rng);
    let blinded = blind_with_factor(secret, &r)?;
    Ok((blinded, r))
}

/// Blind `secret` with a caller-supplied factor: `B_ = Y + rG`.
pub fn blind_with_factor(secret: &[u8], r: &SecretKey) -> Result<PublicKey> {
    let y = hash_to_curve(secret)?;
    y.add(&r.public_key())
}

/// Mint side: `C_ = k B_` without a DLEQ proof.
pub fn sign_point(k: &SecretKey, blinded: &PublicKey) -> Result<PublicKey> {
    blinded.mul(k)
}

/// Mint side: `C_ = k B_` together with a DLEQ proof binding `C_` to `K = kG`.
pub fn sign<R: RngCore + CryptoRng>(
    k: &SecretKey,
    blinded: &PublicKey,
    rng: &mut R,
) -> Result<(PublicKey, DleqProof)> {
    let signed = sign_point(k, blinded)?;
    let proof = dleq::generate(k, blinded, &signed, rng)?;
    Ok((signed, proof))
}

/// Holder side: `C = C_ - rK`.
///
/// # Errors
///
/// - [`crate::CryptoError::InvalidPoint`] if the result is the identity
pub fn unblind(
    signed: &PublicKey,
    r: &SecretKey,
    mint_pubkey: &PublicKey,
) -> Result<PublicKey> {
    signed.sub(&mint_pubkey.mul(r)?)
}

/// Mint side: does `C` equal `k * hash_to_curve(secret)`?
pub fn verify(k: &SecretKey, unblinded: &PublicKey, secret: &[u8]) -> Result<bool> {
    let y = hash_to_curve(secret)?;
    verify_point(k, unblinded, &y)
}

/// Mint side: does `C` equal `k * Y`? Compared on the compressed encoding.
pub fn verify_point(k: &SecretKey, unblinded: &PublicKey, y: &PublicKey) -> Result<bool> {
    let expected = y.mul(k)?;
    Ok(expected.to_bytes() == unblinded.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CryptoError;
    use hex_literal::hex;

    fn one() -> SecretKey {
        SecretKey::from_slice(&hex!(
            "0000000000000000000000000000000000000000000000000000000000000001"
        ))
        .expect("one")
    }

    #[test]
    fn test_blind_known_vector() {
        let blinded = blind_with_factor(b"test_message", &one()).expect("blind");
        assert_eq!(
            blinded.to_hex(),
            "025cc16fe33b953e2ace39653efb3e7a7049711ae1d8a2f7a9108753f1cdea742b"
        );
    }

    #[test]
    fn test_sign_with_unit_key_is_identity_map() {
        let blinded = blind_with_factor(b"test_message", &one()).expect("blind");
        let signed = sign_point(&one(), &blinded).expect("sign");
        assert_eq!(signed, blinded);
    }

    #[test]
    fn test_round_trip() {
        let mut rng = rand::thread_rng();
        let k = SecretKey::random(&mut rng);
        let secret = b"407915bc212be61a77e3e6d2aeb4c727980bda51cd06a6afc29e2861768a7837";

        let (blinded, r) = blind(secret, &mut rng).expect("blind");
        let (signed, _proof) = sign(&k, &blinded, &mut rng).expect("sign");
        let c = unblind(&signed, &r, &k.public_key()).expect("unblind");

        let y = hash_to_curve(secret).expect("y");
        assert_eq!(c, y.mul(&k).expect("kY"));
        assert!(verify(&k, &c, secret).expect("verify"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_key() {
        let mut rng = rand::thread_rng();
        let k = SecretKey::random(&mut rng);
        let other = SecretKey::random(&mut rng);

        let (blinded, r) = blind(b"secret", &mut rng).expect("blind");
        let c = unblind(&sign_point(&k, &blinded).expect("sign"), &r, &k.public_key())
            .expect("unblind");

        assert!(!verify(&k, &c, b"secreT").expect("verify"));
        assert!(!verify(&other, &c, b"secret").expect("verify"));
    }

    #[test]
    fn test_bit_flips_never_verify() {
        let mut rng = rand::thread_rng();
        let k = SecretKey::random(&mut rng);
        let secret = b"flip me";
        let c = hash_to_curve(secret).expect("y").mul(&k).expect("C");

        let bytes = c.to_bytes();
        for byte in 0..bytes.len() {
            for bit in 0..8 {
                let mut flipped = bytes;
                flipped[byte] ^= 1 << bit;
                // A flip either leaves the curve (unparseable) or lands on a
                // different point; neither may verify.
                if let Ok(candidate) = PublicKey::from_slice(&flipped) {
                    assert!(!verify(&k, &candidate, secret).expect("verify"));
                }
            }
        }
    }

    #[test]
    fn test_unblind_to_identity_rejected() {
        // With k = 1 and B_ = rG (so Y would have to be the identity), C_ - rK = 0.
        let r = one();
        let k = one();
        let signed = r.public_key();
        assert_eq!(
            unblind(&signed, &r, &k.public_key()),
            Err(CryptoError::InvalidPoint)
        );
    }

    #[test]
    fn test_distinct_factors_give_unlinkable_blinds() {
        let mut rng = rand::thread_rng();
        let (b1, r1) = blind(b"same secret", &mut rng).expect("b1");
        let (b2, r2) = blind(b"same secret", &mut rng).expect("b2");
        assert_ne!(r1, r2);
        assert_ne!(b1, b2);
    }
}
