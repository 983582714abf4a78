//! Proof acceptance.
//!
//! A proof is accepted when `C = k * hash_to_curve(secret)` for the keyset key
//! matching its amount and, for P2PK secrets, when its witness satisfies the
//! spending conditions at the supplied time. Whether the proof was already
//! spent is for the caller to decide.

use ecash_crypto::dhke;
use ecash_types::{ParsedSecret, Proof};

use crate::keyset::KeysetRegistry;
use crate::p2pk;
use crate::Result;

/// Check a proof against the registry at unix time `now`.
///
/// Returns `Ok(false)` if the mint signature does not match or the P2PK
/// witness is insufficient. Inactive keysets still redeem.
///
/// # Errors
///
/// - [`crate::MintError::UnknownKeyset`] / [`crate::MintError::UnknownAmount`]
///   if the registry has no key for the proof
/// - any error of [`p2pk::verify_p2pk`] for P2PK secrets
pub fn accept_proof(proof: &Proof, registry: &KeysetRegistry, now: u64) -> Result<bool> {
    let k = registry.signing_key(&proof.id, proof.amount)?;

    if !dhke::verify(k, &proof.c, proof.secret.as_bytes())? {
        tracing::debug!(keyset_id = %proof.id, amount = proof.amount, "proof signature mismatch");
        return Ok(false);
    }

    match proof.secret.parse()? {
        ParsedSecret::Plain => Ok(true),
        ParsedSecret::P2pk(conditions) => p2pk::verify_conditions(
            &conditions,
            proof.secret.as_bytes(),
            proof.witness.as_ref(),
            now,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdhke_mint::{MintClient, MintServer};
    use crate::keyset::MintKeyset;
    use crate::MintError;
    use ecash_crypto::SecretKey;
    use ecash_types::{KeysetId, Secret, SpendingConditions};

    fn issue(registry: &KeysetRegistry, id: KeysetId, secret: Secret, amount: u64) -> Proof {
        let mut rng = rand::thread_rng();
        let (message, state) = MintClient::blind(secret, amount, id, &mut rng).expect("blind");
        let signatures =
            MintServer::sign_blinded_messages(registry, &[message], &mut rng).expect("sign");
        let k = registry.keypair(&id, amount).expect("keypair").public_key;
        MintClient::unblind(&signatures[0], state, &k).expect("unblind")
    }

    fn setup() -> (KeysetRegistry, KeysetId) {
        let mut rng = rand::thread_rng();
        let mut registry = KeysetRegistry::new();
        let id = registry.insert(MintKeyset::generate(&mut rng, "sat", 4));
        (registry, id)
    }

    #[test]
    fn test_plain_proof() {
        let mut rng = rand::thread_rng();
        let (registry, id) = setup();
        let proof = issue(&registry, id, Secret::generate(&mut rng), 2);
        assert!(accept_proof(&proof, &registry, 0).expect("accept"));
    }

    #[test]
    fn test_tampered_proofs_rejected() {
        let mut rng = rand::thread_rng();
        let (registry, id) = setup();
        let proof = issue(&registry, id, Secret::generate(&mut rng), 2);

        let mut other_secret = proof.clone();
        other_secret.secret = Secret::generate(&mut rng);
        assert!(!accept_proof(&other_secret, &registry, 0).expect("secret"));

        // Same keyset, different amount key.
        let mut other_amount = proof.clone();
        other_amount.amount = 4;
        assert!(!accept_proof(&other_amount, &registry, 0).expect("amount"));

        let mut missing_amount = proof.clone();
        missing_amount.amount = 3;
        assert!(matches!(
            accept_proof(&missing_amount, &registry, 0),
            Err(MintError::UnknownAmount { .. })
        ));

        let mut unknown = proof;
        unknown.id = KeysetId::from_bytes([9; 8]);
        assert!(matches!(
            accept_proof(&unknown, &registry, 0),
            Err(MintError::UnknownKeyset(_))
        ));
    }

    #[test]
    fn test_p2pk_proof() {
        let mut rng = rand::thread_rng();
        let (registry, id) = setup();
        let owner = SecretKey::random(&mut rng);
        let secret = SpendingConditions::with_random_nonce(owner.public_key(), &mut rng)
            .to_secret()
            .expect("secret");
        let mut proof = issue(&registry, id, secret, 1);

        assert!(matches!(
            accept_proof(&proof, &registry, 0),
            Err(MintError::MissingWitness)
        ));

        let thief = SecretKey::random(&mut rng);
        p2pk::sign_proof(&mut proof, &thief, &[0u8; 32]);
        assert!(!accept_proof(&proof, &registry, 0).expect("thief"));

        p2pk::sign_proof(&mut proof, &owner, &[0u8; 32]);
        assert!(accept_proof(&proof, &registry, 0).expect("owner"));
    }

    #[test]
    fn test_mint_signature_checked_before_witness() {
        let mut rng = rand::thread_rng();
        let (registry, id) = setup();
        let owner = SecretKey::random(&mut rng);
        let secret = SpendingConditions::with_random_nonce(owner.public_key(), &mut rng)
            .to_secret()
            .expect("secret");
        let mut proof = issue(&registry, id, secret, 1);
        proof.c = owner.public_key();

        // Bad C short-circuits; the missing witness is never reported.
        assert!(!accept_proof(&proof, &registry, 0).expect("accept"));
    }

    #[test]
    fn test_inactive_keyset_still_redeems() {
        let mut rng = rand::thread_rng();
        let (mut registry, id) = setup();
        let proof = issue(&registry, id, Secret::generate(&mut rng), 1);
        registry.get_mut(&id).expect("keyset").set_active(false);
        assert!(accept_proof(&proof, &registry, 0).expect("accept"));
    }
}
