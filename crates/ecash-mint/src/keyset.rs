//! Mint keysets.
//!
//! A keyset holds one key pair per amount. Its id is derived from the public
//! keys, so two mints configured with the same keys advertise the same id.

use std::collections::{BTreeMap, HashMap};

use ecash_crypto::{PublicKey, SecretKey};
use ecash_types::{Amount, KeysetId};
use rand_core::{CryptoRng, RngCore};

use crate::{MintError, Result};

/// Signing key `k` and its public key `K = kG` for one amount.
#[derive(Clone, Debug)]
pub struct MintKeyPair {
    /// Signing key `k`.
    pub secret_key: SecretKey,
    /// Advertised key `K`.
    pub public_key: PublicKey,
}

impl MintKeyPair {
    /// Derive `K` from `k`.
    pub fn new(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }
}

/// One key pair per amount, plus the keyset's unit and status.
#[derive(Clone, Debug)]
pub struct MintKeyset {
    id: KeysetId,
    unit: String,
    active: bool,
    keys: BTreeMap<Amount, MintKeyPair>,
}

impl MintKeyset {
    /// Build a keyset from explicit signing keys.
    pub fn from_secret_keys(
        unit: impl Into<String>,
        active: bool,
        keys: BTreeMap<Amount, SecretKey>,
    ) -> Self {
        let keys: BTreeMap<_, _> = keys
            .into_iter()
            .map(|(amount, k)| (amount, MintKeyPair::new(k)))
            .collect();
        let id = KeysetId::from_keys(keys.iter().map(|(amount, pair)| (*amount, &pair.public_key)));
        Self {
            id,
            unit: unit.into(),
            active,
            keys,
        }
    }

    /// Random active keyset for amounts `1, 2, 4, ..., 2^(max_order - 1)`.
    pub fn generate<R: RngCore + CryptoRng>(
        rng: &mut R,
        unit: impl Into<String>,
        max_order: u8,
    ) -> Self {
        let keys = (0..u32::from(max_order.min(64)))
            .map(|order| (1u64 << order, SecretKey::random(rng)))
            .collect();
        Self::from_secret_keys(unit, true, keys)
    }

    /// Id derived from the public keys.
    pub fn id(&self) -> KeysetId {
        self.id
    }

    /// Currency unit, e.g. `sat`.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Whether the keyset signs new outputs. Inactive keysets still redeem.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Retire or reactivate the keyset. The id does not change.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Key pair for `amount`, if the keyset has one.
    pub fn keypair(&self, amount: Amount) -> Option<&MintKeyPair> {
        self.keys.get(&amount)
    }

    /// Amount to public key map, as advertised to wallets.
    pub fn public_keys(&self) -> BTreeMap<Amount, PublicKey> {
        self.keys
            .iter()
            .map(|(amount, pair)| (*amount, pair.public_key))
            .collect()
    }

    /// Amounts with a key, ascending.
    pub fn amounts(&self) -> impl Iterator<Item = Amount> + '_ {
        self.keys.keys().copied()
    }
}

/// Keysets known to a mint, by id.
///
/// Passed explicitly to every operation that needs it; it is read-only while
/// proofs are verified and can be shared across threads behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct KeysetRegistry {
    keysets: HashMap<KeysetId, MintKeyset>,
}

impl KeysetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a keyset. Returns its id.
    pub fn insert(&mut self, keyset: MintKeyset) -> KeysetId {
        let id = keyset.id();
        tracing::info!(
            keyset_id = %id,
            unit = keyset.unit(),
            active = keyset.is_active(),
            amounts = keyset.keys.len(),
            "keyset registered"
        );
        self.keysets.insert(id, keyset);
        id
    }

    /// Keyset by id.
    pub fn get(&self, id: &KeysetId) -> Option<&MintKeyset> {
        self.keysets.get(id)
    }

    /// Keyset by id, for status changes.
    pub fn get_mut(&mut self, id: &KeysetId) -> Option<&mut MintKeyset> {
        self.keysets.get_mut(id)
    }

    /// Key pair for `(id, amount)`.
    ///
    /// # Errors
    ///
    /// - [`MintError::UnknownKeyset`] if no keyset has this id
    /// - [`MintError::UnknownAmount`] if the keyset has no key for `amount`
    pub fn keypair(&self, id: &KeysetId, amount: Amount) -> Result<&MintKeyPair> {
        let keyset = self.get(id).ok_or_else(|| {
            tracing::warn!(keyset_id = %id, "unknown keyset");
            MintError::UnknownKeyset(*id)
        })?;
        keyset
            .keypair(amount)
            .ok_or(MintError::UnknownAmount { id: *id, amount })
    }

    /// Signing key `k` for `(id, amount)`.
    ///
    /// # Errors
    ///
    /// Same as [`KeysetRegistry::keypair`].
    pub fn signing_key(&self, id: &KeysetId, amount: Amount) -> Result<&SecretKey> {
        self.keypair(id, amount).map(|pair| &pair.secret_key)
    }

    /// Keysets that still sign new outputs, in no particular order.
    pub fn active_keysets(&self) -> impl Iterator<Item = &MintKeyset> {
        self.keysets.values().filter(|keyset| keyset.is_active())
    }

    /// Number of keysets, active or not.
    pub fn len(&self) -> usize {
        self.keysets.len()
    }

    /// Whether no keyset is registered.
    pub fn is_empty(&self) -> bool {
        self.keysets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_powers_of_two() {
        let mut rng = rand::thread_rng();
        let keyset = MintKeyset::generate(&mut rng, "sat", 4);
        assert_eq!(keyset.amounts().collect::<Vec<_>>(), vec![1, 2, 4, 8]);
        assert!(keyset.is_active());
        assert_eq!(keyset.unit(), "sat");
        assert_eq!(keyset.id().version(), 0x00);

        let pair = keyset.keypair(4).expect("amount 4");
        assert_eq!(pair.public_key, pair.secret_key.public_key());
        assert!(keyset.keypair(3).is_none());
    }

    #[test]
    fn test_id_depends_only_on_public_keys() {
        let mut rng = rand::thread_rng();
        let keys: BTreeMap<Amount, SecretKey> = [1, 2]
            .into_iter()
            .map(|amount| (amount, SecretKey::random(&mut rng)))
            .collect();

        let a = MintKeyset::from_secret_keys("sat", true, keys.clone());
        let b = MintKeyset::from_secret_keys("usd", false, keys);
        assert_eq!(a.id(), b.id());
        assert_eq!(
            a.id(),
            KeysetId::from_keys(a.public_keys().iter().map(|(amount, k)| (*amount, k)))
        );
    }

    #[test]
    fn test_registry_lookup_errors() {
        let mut rng = rand::thread_rng();
        let mut registry = KeysetRegistry::new();
        assert!(registry.is_empty());

        let id = registry.insert(MintKeyset::generate(&mut rng, "sat", 2));
        assert_eq!(registry.len(), 1);
        assert!(registry.signing_key(&id, 2).is_ok());

        assert!(matches!(
            registry.signing_key(&id, 4),
            Err(MintError::UnknownAmount { amount: 4, .. })
        ));

        let unknown = KeysetId::from_bytes([0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(matches!(
            registry.signing_key(&unknown, 1),
            Err(MintError::UnknownKeyset(id)) if id == unknown
        ));
    }

    #[test]
    fn test_active_filter() {
        let mut rng = rand::thread_rng();
        let mut registry = KeysetRegistry::new();
        let old = registry.insert(MintKeyset::generate(&mut rng, "sat", 1));
        registry.insert(MintKeyset::generate(&mut rng, "sat", 1));

        registry.get_mut(&old).expect("old").set_active(false);
        let active: Vec<_> = registry.active_keysets().map(MintKeyset::id).collect();
        assert_eq!(active.len(), 1);
        assert_ne!(active[0], old);
    }
}
