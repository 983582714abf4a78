//! Deterministic map from arbitrary bytes to a secp256k1 point.
//!
//! ```text
//! msg_hash  = SHA-256(DOMAIN_SEPARATOR || message)
//! candidate = SHA-256(msg_hash || counter_u32_le)     counter = 0, 1, ...
//! Y         = 0x02 || candidate                       first valid point wins
//! ```
//!
//! The separator, the counter encoding and [`MAX_ATTEMPTS`] are protocol
//! constants. Changing any of them breaks interoperability with every other
//! wallet and mint.

use sha2::{Digest, Sha256};

use crate::keys::PublicKey;
use crate::{CryptoError, Result};

/// Domain separation tag prefixed to every hash-to-curve input.
pub const DOMAIN_SEPARATOR: &[u8] = b"Secp256k1_HashToCurve_Cashu_";

/// Upper bound on the counter. Roughly half of all x-coordinates are valid,
/// so this is never reached in practice.
pub const MAX_ATTEMPTS: u32 = 1 << 16;

/// Hash `message` to a curve point with even y.
///
/// # Errors
///
/// - [`CryptoError::HashToCurveExhausted`] if no valid point is found within
///   [`MAX_ATTEMPTS`] counters
pub fn hash_to_curve(message: &[u8]) -> Result<PublicKey> {
    hash_to_curve_bounded(message, MAX_ATTEMPTS)
}

/// [`hash_to_curve`] trying at most `max_attempts` counters.
///
/// Only [`MAX_ATTEMPTS`] yields points other implementations agree on.
pub fn hash_to_curve_bounded(message: &[u8], max_attempts: u32) -> Result<PublicKey> {
    let msg_hash: [u8; 32] = Sha256::new()
        .chain_update(DOMAIN_SEPARATOR)
        .chain_update(message)
        .finalize()
        .into();

    let mut candidate = [0u8; 33];
    candidate[0] = 0x02;

    for counter in 0..max_attempts {
        let hash = Sha256::new()
            .chain_update(msg_hash)
            .chain_update(counter.to_le_bytes())
            .finalize();
        candidate[1..].copy_from_slice(&hash);

        if let Ok(point) = PublicKey::from_slice(&candidate) {
            if counter > 0 {
                tracing::trace!(counter, "hash_to_curve: point found after retries");
            }
            return Ok(point);
        }
    }

    tracing::warn!(max_attempts, "hash_to_curve: no point found");
    Err(CryptoError::HashToCurveExhausted(max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_constants() {
        assert_eq!(DOMAIN_SEPARATOR, b"Secp256k1_HashToCurve_Cashu_");
        assert_eq!(MAX_ATTEMPTS, 65_536);
    }

    #[test]
    fn test_known_vectors() {
        let cases = [
            (
                hex!("0000000000000000000000000000000000000000000000000000000000000000"),
                "024cce997d3b518f739663b757deaec95bcd9473c30a14ac2fd04023a739d1a725",
            ),
            (
                hex!("0000000000000000000000000000000000000000000000000000000000000001"),
                "022e7158e11c9506f1aa4248bf531298daa7febd6194f003edcd9b93ade6253acf",
            ),
            (
                hex!("0000000000000000000000000000000000000000000000000000000000000002"),
                "026cdbe15362df59cd1dd3c9c11de8aedac2106eca69236ecd9fbe117af897be4f",
            ),
        ];

        for (message, expected) in cases {
            let y = hash_to_curve(&message).expect("hash_to_curve");
            assert_eq!(y.to_hex(), expected);
        }
    }

    #[test]
    fn test_exhausted_bound_is_reported() {
        assert_eq!(
            hash_to_curve_bounded(b"test_message", 0),
            Err(CryptoError::HashToCurveExhausted(0))
        );

        let bounded = hash_to_curve_bounded(b"test_message", MAX_ATTEMPTS).expect("bounded");
        assert_eq!(bounded, hash_to_curve(b"test_message").expect("default"));
    }

    #[test]
    fn test_deterministic() {
        let secret = br#"["P2PK",{"nonce":"3db7accc3ad1fb77cf58b77f00366add0804ff405cb5350a979db30734ea95c6","data":"028a4acbe44dc982f54951bed505844491e857c0cfde0e3bfdf8506bd82b6667e1","tags":[["sigflag","SIG_INPUTS"]]}]"#;
        let y1 = hash_to_curve(secret).expect("first");
        let y2 = hash_to_curve(secret).expect("second");
        assert_eq!(y1, y2);
    }

    #[test]
    fn test_even_parity_prefix() {
        for message in [&b""[..], &b"test_secret_123"[..], &b"a"[..], &[0xFFu8; 100][..]] {
            let y = hash_to_curve(message).expect("hash_to_curve");
            assert_eq!(y.to_bytes()[0], 0x02);
        }
    }

    #[test]
    fn test_different_inputs_different_points() {
        let a = hash_to_curve(b"secret-a").expect("a");
        let b = hash_to_curve(b"secret-b").expect("b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_whitespace_changes_point() {
        let compact = hash_to_curve(br#"["P2PK",{"nonce":"00"}]"#).expect("compact");
        let spaced = hash_to_curve(br#"["P2PK", {"nonce": "00"}]"#).expect("spaced");
        assert_ne!(compact, spaced);
    }
}
