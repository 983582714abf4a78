//! Schnorr adaptor signatures for atomic swaps.
//!
//! An encrypted signature under key `P` and encryption point `T = tG` is a
//! BIP-340 signature whose nonce is offset by `T`. Anyone holding it can check
//! it against `(P, T, message)`. Only the holder of `t` can decrypt it into an
//! ordinary signature, and once that signature is published the holder of the
//! encrypted one recovers `t`.
//!
//! ```text
//! encrypt:  R = rG + T, negating r and R when R has odd y
//!           e = H_challenge(R.x || P.x || SHA-256(message))
//!           s' = r + e x
//! decrypt:  s = s' + t   (s' - t if negated)    signature = R.x || s
//! recover:  t = s - s'   (s' - s if negated)
//! ```
//!
//! Decrypted signatures verify with [`crate::schnorr::verify_message`], so a
//! P2PK proof locked to the tweaked key `P + T` (see [`tweak_public_key`]) can
//! only be spent by someone who knows both `p` and `t`.

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sha2::{Digest, Sha256};

use crate::keys::{PublicKey, SecretKey};
use crate::schnorr::{self, Signature, SIGNATURE_LEN};
use crate::{CryptoError, Result};

const CHALLENGE_TAG: &[u8] = b"BIP0340/challenge";

/// A signature encrypted to an adaptor point.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSignature {
    /// Final nonce point, always with even y.
    #[serde(rename = "R")]
    pub r: PublicKey,
    /// Encrypted response `s'`.
    #[serde_as(as = "Hex")]
    pub s: [u8; 32],
    /// The nonce was negated, so decryption subtracts `t`.
    pub needs_negation: bool,
}

/// `P + T`: the key a counterparty locks to so that spending needs `t`.
pub fn tweak_public_key(pubkey: &PublicKey, adaptor_point: &PublicKey) -> Result<PublicKey> {
    pubkey.add(adaptor_point)
}

/// `p + t`: the signing key for [`tweak_public_key`].
pub fn tweak_secret_key(key: &SecretKey, adaptor_secret: &SecretKey) -> Result<SecretKey> {
    key.add(adaptor_secret)
}

/// BIP-340 challenge `e` as a scalar.
fn challenge(r: &PublicKey, pubkey: &PublicKey, message: &[u8]) -> Result<SecretKey> {
    let tag = Sha256::digest(CHALLENGE_TAG);
    let e: [u8; 32] = Sha256::new()
        .chain_update(tag)
        .chain_update(tag)
        .chain_update(r.x_only().serialize())
        .chain_update(pubkey.x_only().serialize())
        .chain_update(schnorr::message_digest(message))
        .finalize()
        .into();
    SecretKey::from_slice(&e)
}

/// Encrypt a signature on `SHA-256(message)` to `adaptor_point`.
///
/// # Errors
///
/// - [`CryptoError::InvalidPoint`] if the nonce cancels the adaptor point
/// - [`CryptoError::InvalidScalar`] if the challenge or response falls
///   outside `[1, n)` (probability ~2^-128)
pub fn encrypted_sign<R: RngCore + CryptoRng>(
    key: &SecretKey,
    adaptor_point: &PublicKey,
    message: &[u8],
    rng: &mut R,
) -> Result<EncryptedSignature> {
    let nonce = SecretKey::random(rng);
    encrypted_sign_with_nonce(key, adaptor_point, message, &nonce)
}

/// [`encrypted_sign`] with a caller-chosen nonce. The nonce must never be
/// reused.
pub fn encrypted_sign_with_nonce(
    key: &SecretKey,
    adaptor_point: &PublicKey,
    message: &[u8],
    nonce: &SecretKey,
) -> Result<EncryptedSignature> {
    let pubkey = key.public_key();
    let x = if pubkey.has_odd_y() { key.negate() } else { key.clone() };

    let r_point = nonce.public_key().add(adaptor_point)?;
    let needs_negation = r_point.has_odd_y();
    let (r, r_point) = if needs_negation {
        (nonce.negate(), r_point.negate())
    } else {
        (nonce.clone(), r_point)
    };

    let e = challenge(&r_point, &pubkey, message)?;
    let s = r.add(&x.mul(&e)?)?;

    Ok(EncryptedSignature {
        r: r_point,
        s: s.to_bytes(),
        needs_negation,
    })
}

/// Check an encrypted signature without decrypting it.
///
/// Returns `Ok(false)` for anything that does not check out.
pub fn verify_encrypted(
    pubkey: &PublicKey,
    adaptor_point: &PublicKey,
    message: &[u8],
    encrypted: &EncryptedSignature,
) -> Result<bool> {
    if encrypted.r.has_odd_y() {
        return Ok(false);
    }
    let Ok(s) = SecretKey::from_slice(&encrypted.s) else {
        return Ok(false);
    };
    let Ok(e) = challenge(&encrypted.r, pubkey, message) else {
        return Ok(false);
    };
    let even_pubkey = PublicKey::from_x_only(&pubkey.x_only().serialize())?;

    // s'G - eP is rG, or -rG after negation.
    let Ok(nonce_point) = s.public_key().sub(&even_pubkey.mul(&e)?) else {
        return Ok(false);
    };
    let expected = if encrypted.needs_negation {
        encrypted.r.add(adaptor_point)
    } else {
        encrypted.r.sub(adaptor_point)
    };

    Ok(expected.is_ok_and(|point| point == nonce_point))
}

/// Decrypt with the adaptor secret `t` into a BIP-340 signature.
///
/// # Errors
///
/// - [`CryptoError::InvalidScalar`] if `s'` is not a valid scalar or the
///   result is zero
pub fn decrypt(adaptor_secret: &SecretKey, encrypted: &EncryptedSignature) -> Result<Signature> {
    let s_enc = SecretKey::from_slice(&encrypted.s)?;
    let s = if encrypted.needs_negation {
        s_enc.sub(adaptor_secret)?
    } else {
        s_enc.add(adaptor_secret)?
    };

    let mut bytes = [0u8; SIGNATURE_LEN];
    bytes[..32].copy_from_slice(&encrypted.r.x_only().serialize());
    bytes[32..].copy_from_slice(&s.to_bytes());
    Signature::from_slice(&bytes)
}

/// Recover `t` from an encrypted signature and the signature decrypted from
/// it.
///
/// # Errors
///
/// - [`CryptoError::AdaptorMismatch`] if `revealed` was not decrypted from
///   `encrypted`, or the recovered scalar does not match `adaptor_point`
pub fn recover(
    adaptor_point: &PublicKey,
    encrypted: &EncryptedSignature,
    revealed: &Signature,
) -> Result<SecretKey> {
    let bytes = revealed.to_bytes();
    if bytes[..32] != encrypted.r.x_only().serialize() {
        return Err(CryptoError::AdaptorMismatch);
    }

    let s = SecretKey::from_slice(&bytes[32..])?;
    let s_enc = SecretKey::from_slice(&encrypted.s)?;
    let t = if encrypted.needs_negation {
        s_enc.sub(&s)
    } else {
        s.sub(&s_enc)
    }
    .map_err(|_| CryptoError::AdaptorMismatch)?;

    if t.public_key() != *adaptor_point {
        tracing::debug!("adaptor: recovered scalar does not open the adaptor point");
        return Err(CryptoError::AdaptorMismatch);
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(last: u8) -> SecretKey {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        SecretKey::from_slice(&bytes).expect("small scalar")
    }

    #[test]
    fn test_encrypt_verify_decrypt() {
        let mut rng = rand::thread_rng();
        let key = SecretKey::random(&mut rng);
        let t = SecretKey::random(&mut rng);
        let adaptor_point = t.public_key();
        let message = b"swap leg";

        let encrypted =
            encrypted_sign(&key, &adaptor_point, message, &mut rng).expect("encrypted sign");
        assert!(verify_encrypted(&key.public_key(), &adaptor_point, message, &encrypted)
            .expect("verify encrypted"));

        let signature = decrypt(&t, &encrypted).expect("decrypt");
        assert!(schnorr::verify_message(&key.public_key(), message, &signature));
        assert!(!schnorr::verify_message(&key.public_key(), b"other leg", &signature));
    }

    #[test]
    fn test_encrypted_signature_is_not_a_signature() {
        let mut rng = rand::thread_rng();
        let key = SecretKey::random(&mut rng);
        let t = SecretKey::random(&mut rng);
        let encrypted =
            encrypted_sign(&key, &t.public_key(), b"msg", &mut rng).expect("encrypted sign");

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..32].copy_from_slice(&encrypted.r.x_only().serialize());
        bytes[32..].copy_from_slice(&encrypted.s);
        let raw = Signature::from_slice(&bytes).expect("64 bytes");
        assert!(!schnorr::verify_message(&key.public_key(), b"msg", &raw));
    }

    #[test]
    fn test_verify_encrypted_rejects_wrong_inputs() {
        let mut rng = rand::thread_rng();
        let key = SecretKey::random(&mut rng);
        let other = SecretKey::random(&mut rng);
        let t = SecretKey::random(&mut rng);
        let encrypted =
            encrypted_sign(&key, &t.public_key(), b"msg", &mut rng).expect("encrypted sign");

        let check = |pubkey: &PublicKey, point: &PublicKey, message: &[u8]| {
            verify_encrypted(pubkey, point, message, &encrypted).expect("verify encrypted")
        };
        assert!(check(&key.public_key(), &t.public_key(), b"msg"));
        assert!(!check(&other.public_key(), &t.public_key(), b"msg"));
        assert!(!check(&key.public_key(), &other.public_key(), b"msg"));
        assert!(!check(&key.public_key(), &t.public_key(), b"msG"));

        let mut tampered = encrypted.clone();
        tampered.s[31] ^= 0x01;
        assert!(!verify_encrypted(&key.public_key(), &t.public_key(), b"msg", &tampered)
            .expect("verify encrypted"));

        let mut flipped = encrypted.clone();
        flipped.needs_negation = !flipped.needs_negation;
        assert!(!verify_encrypted(&key.public_key(), &t.public_key(), b"msg", &flipped)
            .expect("verify encrypted"));

        let mut zero = encrypted;
        zero.s = [0u8; 32];
        assert!(!verify_encrypted(&key.public_key(), &t.public_key(), b"msg", &zero)
            .expect("verify encrypted"));
    }

    #[test]
    fn test_recover_adaptor_secret() {
        let mut rng = rand::thread_rng();
        let key = SecretKey::random(&mut rng);
        let t = SecretKey::random(&mut rng);
        let adaptor_point = t.public_key();

        let encrypted =
            encrypted_sign(&key, &adaptor_point, b"msg", &mut rng).expect("encrypted sign");
        let revealed = decrypt(&t, &encrypted).expect("decrypt");

        let recovered = recover(&adaptor_point, &encrypted, &revealed).expect("recover");
        assert_eq!(recovered, t);
    }

    #[test]
    fn test_recover_rejects_unrelated_signature() {
        let mut rng = rand::thread_rng();
        let key = SecretKey::random(&mut rng);
        let t = SecretKey::random(&mut rng);
        let encrypted =
            encrypted_sign(&key, &t.public_key(), b"msg", &mut rng).expect("encrypted sign");

        let unrelated = schnorr::sign_message(&key, b"msg", &[0u8; 32]);
        assert_eq!(
            recover(&t.public_key(), &encrypted, &unrelated),
            Err(CryptoError::AdaptorMismatch)
        );

        // Decrypting with the wrong secret yields a scalar that does not open T.
        let wrong = decrypt(&SecretKey::random(&mut rng), &encrypted).expect("decrypt");
        assert_eq!(
            recover(&t.public_key(), &encrypted, &wrong),
            Err(CryptoError::AdaptorMismatch)
        );
    }

    #[test]
    fn test_both_nonce_parities() {
        let key = scalar(7);
        let t = scalar(11);
        let adaptor_point = t.public_key();
        let mut seen = [false; 2];

        for n in 1..=32u8 {
            let encrypted =
                encrypted_sign_with_nonce(&key, &adaptor_point, b"msg", &scalar(n)).expect("sign");
            seen[usize::from(encrypted.needs_negation)] = true;

            assert!(verify_encrypted(&key.public_key(), &adaptor_point, b"msg", &encrypted)
                .expect("verify encrypted"));
            let signature = decrypt(&t, &encrypted).expect("decrypt");
            assert!(schnorr::verify_message(&key.public_key(), b"msg", &signature));
            assert_eq!(recover(&adaptor_point, &encrypted, &signature).expect("recover"), t);
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_odd_y_signing_key() {
        let key = scalar(5);
        let key = if key.public_key().has_odd_y() { key } else { key.negate() };
        assert!(key.public_key().has_odd_y());

        let t = scalar(9);
        let encrypted =
            encrypted_sign_with_nonce(&key, &t.public_key(), b"msg", &scalar(3)).expect("sign");
        assert!(verify_encrypted(&key.public_key(), &t.public_key(), b"msg", &encrypted)
            .expect("verify encrypted"));
        let signature = decrypt(&t, &encrypted).expect("decrypt");
        assert!(schnorr::verify_message(&key.public_key(), b"msg", &signature));
    }

    #[test]
    fn test_tweaked_keys_agree() {
        let mut rng = rand::thread_rng();
        let p = SecretKey::random(&mut rng);
        let t = SecretKey::random(&mut rng);

        let tweaked = tweak_public_key(&p.public_key(), &t.public_key()).expect("tweak");
        let tweaked_secret = tweak_secret_key(&p, &t).expect("tweak secret");
        assert_eq!(tweaked_secret.public_key(), tweaked);

        let signature = schnorr::sign_message(&tweaked_secret, b"msg", &[0u8; 32]);
        assert!(schnorr::verify_message(&tweaked, b"msg", &signature));
        assert!(!schnorr::verify_message(&p.public_key(), b"msg", &signature));
    }

    #[test]
    fn test_serde_round_trip() {
        let encrypted = encrypted_sign_with_nonce(&scalar(2), &scalar(3).public_key(), b"m", &scalar(4))
            .expect("sign");
        let json = serde_json::to_value(&encrypted).expect("serialize");
        assert!(json["R"].is_string());
        assert_eq!(json["s"], serde_json::Value::String(hex::encode(encrypted.s)));
        let back: EncryptedSignature = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, encrypted);
    }
}
