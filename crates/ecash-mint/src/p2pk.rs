//! Pay-to-public-key witness verification.
//!
//! A P2PK proof is spendable when at least `n_sigs` distinct keys from
//! `{data} ∪ pubkeys` have signed `SHA-256(secret)` with BIP-340. After the
//! locktime, if refund keys are listed, they replace the main set entirely
//! and `n_sigs_refund` applies instead.
//!
//! The message is always the secret exactly as received. Re-serialising it,
//! even to an equivalent JSON value, changes the digest and invalidates every
//! signature.

use ecash_crypto::schnorr::{self, Signature};
use ecash_crypto::{PublicKey, SecretKey};
use ecash_types::{Proof, SigFlag, SpendingConditions, Witness};

use crate::{MintError, Result};

/// Verify a P2PK witness over the raw bytes of a secret.
///
/// `now` is unix seconds, supplied by the caller.
///
/// Returns `Ok(false)` when the witness is present but too few signatures
/// match.
///
/// # Errors
///
/// - [`MintError::MalformedSecret`] if `secret` is not a valid P2PK secret
/// - [`MintError::UnsupportedSigflag`] for any sigflag other than `SIG_INPUTS`
/// - [`MintError::UnsatisfiableCondition`] if the threshold exceeds the
///   number of distinct eligible keys
/// - [`MintError::MissingWitness`] if `witness` is `None`
pub fn verify_p2pk(secret: &[u8], witness: Option<&Witness>, now: u64) -> Result<bool> {
    let text = std::str::from_utf8(secret)
        .map_err(|e| MintError::MalformedSecret(format!("secret is not UTF-8: {e}")))?;
    let conditions = SpendingConditions::from_secret_str(text)?;
    verify_conditions(&conditions, secret, witness, now)
}

/// Verify a witness against already-parsed conditions.
///
/// `message` must be the original secret bytes the conditions were parsed
/// from.
///
/// # Errors
///
/// Same as [`verify_p2pk`], except for parsing.
pub fn verify_conditions(
    conditions: &SpendingConditions,
    message: &[u8],
    witness: Option<&Witness>,
    now: u64,
) -> Result<bool> {
    if conditions.sigflag != SigFlag::SigInputs {
        return Err(MintError::UnsupportedSigflag(
            conditions.sigflag.as_str().to_string(),
        ));
    }

    let (keys, threshold) = eligible_keys(conditions, now);
    if threshold == 0 {
        return Err(MintError::MalformedSecret(
            "signature threshold must be at least 1".to_string(),
        ));
    }
    if threshold > keys.len() as u64 {
        return Err(MintError::UnsatisfiableCondition {
            required: threshold,
            available: keys.len(),
        });
    }

    let witness = witness.ok_or(MintError::MissingWitness)?;
    let valid = count_valid_signatures(message, &keys, &witness.signatures);
    tracing::debug!(valid, threshold, "p2pk signatures checked");

    Ok(valid as u64 >= threshold)
}

/// Keys allowed to sign at time `now` and the threshold that applies.
fn eligible_keys(conditions: &SpendingConditions, now: u64) -> (Vec<PublicKey>, u64) {
    let refund_open = conditions.locktime.is_some_and(|locktime| now > locktime);

    if refund_open && !conditions.refund.is_empty() {
        tracing::debug!(now, locktime = conditions.locktime, "p2pk refund path");
        return (
            distinct(conditions.refund.iter()),
            conditions.n_sigs_refund.unwrap_or(1),
        );
    }

    let main = std::iter::once(&conditions.data).chain(conditions.pubkeys.iter());
    (distinct(main), conditions.n_sigs.unwrap_or(1))
}

/// Keys with distinct x-only coordinates, in first-seen order.
///
/// BIP-340 verifies against the x-coordinate alone, so `02 || x` and
/// `03 || x` are the same signer.
fn distinct<'a>(keys: impl Iterator<Item = &'a PublicKey>) -> Vec<PublicKey> {
    let mut out: Vec<PublicKey> = Vec::new();
    for key in keys {
        if !out.iter().any(|k| k.x_only() == key.x_only()) {
            out.push(*key);
        }
    }
    out
}

/// Number of distinct keys matched by the signatures.
///
/// A signature counts towards at most one key and a key is counted at most
/// once. Signatures that do not decode are skipped.
fn count_valid_signatures(message: &[u8], keys: &[PublicKey], signatures: &[String]) -> usize {
    let mut matched = vec![false; keys.len()];

    for encoded in signatures {
        let Ok(signature) = Signature::from_hex(encoded) else {
            tracing::debug!("p2pk: skipping undecodable signature");
            continue;
        };
        let hit = keys
            .iter()
            .enumerate()
            .find(|(i, key)| !matched[*i] && schnorr::verify_message(key, message, &signature));
        match hit {
            Some((i, _)) => matched[i] = true,
            None => tracing::debug!("p2pk: signature matches no remaining key"),
        }
    }

    matched.into_iter().filter(|m| *m).count()
}

/// Wallet side: sign a proof's secret and append the signature to its
/// witness.
pub fn sign_proof(proof: &mut Proof, key: &SecretKey, aux_rand: &[u8; 32]) {
    let signature = schnorr::sign_message(key, proof.secret.as_bytes(), aux_rand);
    proof.witness.get_or_insert_with(Witness::default).push(&signature);
}
