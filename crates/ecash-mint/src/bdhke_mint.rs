//! Blind issuance over BDHKE.
//!
//! Implements the wallet and mint sides of issuing a token. The wallet blinds
//! a secret, the mint signs the blinded point with the keyset key for the
//! requested amount, and the wallet unblinds the result into a [`Proof`].
//!
//! ## Protocol Flow
//!
//! 1. Wallet: `MintClient::blind(secret, amount, id)` -> `(BlindedMessage, BlindState)`
//! 2. Mint: `MintServer::sign_blinded_messages(registry, messages)` -> `Vec<BlindSignature>`
//! 3. Wallet: `MintClient::unblind(signature, state, K)` -> `Proof`

use ecash_crypto::dleq;
use ecash_crypto::{dhke, PublicKey, SecretKey};
use ecash_types::{Amount, BlindSignature, BlindedMessage, KeysetId, Proof, ProofDleq, Secret};
use rand_core::{CryptoRng, RngCore};

use crate::keyset::KeysetRegistry;
use crate::{MintError, Result};

/// Wallet-side state kept between `blind` and `unblind`.
pub struct BlindState {
    secret: Secret,
    blinding_factor: SecretKey,
    amount: Amount,
    id: KeysetId,
}

impl BlindState {
    /// The secret being blinded.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Requested amount.
    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// Wallet-side issuance operations.
pub struct MintClient;

/// Mint-side issuance operations.
pub struct MintServer;

impl MintClient {
    /// Blind `secret` for `amount` in keyset `id`.
    ///
    /// # Errors
    ///
    /// - [`MintError::Crypto`] if hashing the secret to the curve fails
    pub fn blind<R: RngCore + CryptoRng>(
        secret: Secret,
        amount: Amount,
        id: KeysetId,
        rng: &mut R,
    ) -> Result<(BlindedMessage, BlindState)> {
        let (blinded_secret, blinding_factor) = dhke::blind(secret.as_bytes(), rng)?;

        let message = BlindedMessage {
            amount,
            id,
            blinded_secret,
        };
        let state = BlindState {
            secret,
            blinding_factor,
            amount,
            id,
        };

        Ok((message, state))
    }

    /// Unblind a mint signature into a proof.
    ///
    /// `mint_pubkey` is the key the mint advertises for the state's amount.
    /// When the signature carries a DLEQ proof it is checked against that key
    /// and attached to the resulting proof together with the blinding factor.
    ///
    /// # Errors
    ///
    /// - [`MintError::InvalidDleq`] if the DLEQ proof does not verify
    /// - [`MintError::Crypto`] if unblinding yields the identity
    pub fn unblind(
        signature: &BlindSignature,
        state: BlindState,
        mint_pubkey: &PublicKey,
    ) -> Result<Proof> {
        let blinded = dhke::blind_with_factor(state.secret.as_bytes(), &state.blinding_factor)?;

        let dleq = match &signature.dleq {
            Some(proof) => {
                if !dleq::verify_blind(proof, mint_pubkey, &blinded, &signature.c)? {
                    tracing::warn!(keyset_id = %state.id, amount = state.amount, "blind signature failed DLEQ");
                    return Err(MintError::InvalidDleq);
                }
                Some(ProofDleq::new(proof, &state.blinding_factor))
            }
            None => {
                tracing::debug!(keyset_id = %state.id, "blind signature carries no DLEQ proof");
                None
            }
        };

        let c = dhke::unblind(&signature.c, &state.blinding_factor, mint_pubkey)?;

        Ok(Proof {
            amount: state.amount,
            id: state.id,
            secret: state.secret,
            c,
            witness: None,
            dleq,
        })
    }

    /// Check the DLEQ proof carried on a proof, without contacting the mint.
    ///
    /// Returns `Ok(false)` when the proof carries none.
    pub fn verify_proof_dleq(proof: &Proof, mint_pubkey: &PublicKey) -> Result<bool> {
        let Some(carried) = &proof.dleq else {
            return Ok(false);
        };
        let Ok(r) = carried.blinding_factor() else {
            return Ok(false);
        };
        Ok(dleq::verify_unblinded(
            &carried.proof(),
            &r,
            mint_pubkey,
            proof.secret.as_bytes(),
            &proof.c,
        )?)
    }
}

impl MintServer {
    /// Sign blinded messages with the keys of their keysets.
    ///
    /// All messages are checked before any is signed, so a batch either
    /// signs completely or not at all.
    ///
    /// # Errors
    ///
    /// - [`MintError::UnknownKeyset`] / [`MintError::UnknownAmount`] for a
    ///   message the registry cannot sign
    /// - [`MintError::InactiveKeyset`] if a keyset no longer signs outputs
    pub fn sign_blinded_messages<R: RngCore + CryptoRng>(
        registry: &KeysetRegistry,
        messages: &[BlindedMessage],
        rng: &mut R,
    ) -> Result<Vec<BlindSignature>> {
        let mut keys = Vec::with_capacity(messages.len());
        for message in messages {
            let keyset = registry
                .get(&message.id)
                .ok_or(MintError::UnknownKeyset(message.id))?;
            if !keyset.is_active() {
                tracing::warn!(keyset_id = %message.id, "refusing to sign with inactive keyset");
                return Err(MintError::InactiveKeyset(message.id));
            }
            keys.push(registry.signing_key(&message.id, message.amount)?);
        }

        let signatures = messages
            .iter()
            .zip(keys)
            .map(|(message, k)| {
                let (c, proof) = dhke::sign(k, &message.blinded_secret, rng)?;
                Ok(BlindSignature {
                    amount: message.amount,
                    id: message.id,
                    c,
                    dleq: Some(proof),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = signatures.len(), "signed blinded messages");
        Ok(signatures)
    }
}
