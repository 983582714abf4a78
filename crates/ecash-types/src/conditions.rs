//! Pay-to-public-key spending conditions.
//!
//! Wire form of a P2PK secret:
//!
//! ```text
//! ["P2PK",{"nonce":"<hex>","data":"<pubkey hex>","tags":[["key","value",...],...]}]
//! ```
//!
//! Recognised tags are listed in [`tag`]. Unknown tags are carried by other
//! protocol extensions and are ignored here; a recognised tag that appears
//! twice or carries a value that does not parse makes the whole secret
//! malformed.

use std::collections::BTreeSet;

use ecash_crypto::PublicKey;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::secret::{Secret, P2PK_KIND};
use crate::{Result, TypesError};

/// Recognised tag keys.
pub mod tag {
    /// Which parts of a transaction a signature commits to.
    pub const SIGFLAG: &str = "sigflag";
    /// Additional signer keys.
    pub const PUBKEYS: &str = "pubkeys";
    /// Signature threshold on the main path.
    pub const N_SIGS: &str = "n_sigs";
    /// Unix time after which the refund keys take over.
    pub const LOCKTIME: &str = "locktime";
    /// Keys allowed to spend after the locktime.
    pub const REFUND: &str = "refund";
    /// Signature threshold on the refund path.
    pub const N_SIGS_REFUND: &str = "n_sigs_refund";

    pub(crate) const KNOWN: [&str; 6] = [SIGFLAG, PUBKEYS, N_SIGS, LOCKTIME, REFUND, N_SIGS_REFUND];
}

/// Signature scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SigFlag {
    /// Signatures commit to the input secret only.
    #[default]
    SigInputs,
    /// Signatures commit to inputs and outputs of the whole transaction.
    SigAll,
    /// A value this implementation does not know.
    Unknown(String),
}

impl SigFlag {
    /// Wire string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SigInputs => "SIG_INPUTS",
            Self::SigAll => "SIG_ALL",
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for SigFlag {
    fn from(s: &str) -> Self {
        match s {
            "SIG_INPUTS" => Self::SigInputs,
            "SIG_ALL" => Self::SigAll,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Parsed body of a P2PK secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendingConditions {
    /// Random hex nonce making each secret unique.
    pub nonce: String,
    /// Primary signer.
    pub data: PublicKey,
    /// Signature scope. Defaults to `SIG_INPUTS`.
    pub sigflag: SigFlag,
    /// Additional signers on the main path.
    pub pubkeys: Vec<PublicKey>,
    /// Main-path threshold. `None` means 1.
    pub n_sigs: Option<u64>,
    /// Unix seconds after which the refund path applies.
    pub locktime: Option<u64>,
    /// Refund signers.
    pub refund: Vec<PublicKey>,
    /// Refund-path threshold. `None` means 1.
    pub n_sigs_refund: Option<u64>,
}

#[derive(Deserialize)]
struct WireData {
    nonce: String,
    data: String,
    #[serde(default)]
    tags: Option<Vec<Vec<serde_json::Value>>>,
}

#[derive(Serialize)]
struct WireDataOut<'a> {
    nonce: &'a str,
    data: String,
    tags: Vec<Vec<String>>,
}

fn malformed(reason: impl std::fmt::Display) -> TypesError {
    TypesError::MalformedSecret(reason.to_string())
}

fn parse_key(hex_key: &str) -> Result<PublicKey> {
    let bytes = hex::decode(hex_key).map_err(|e| malformed(format!("key {hex_key}: {e}")))?;
    PublicKey::from_signer_bytes(&bytes).map_err(|e| malformed(format!("key {hex_key}: {e}")))
}

/// Values of a recognised tag, which must all be strings.
fn string_values(key: &str, values: &[serde_json::Value]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|v| match v {
            serde_json::Value::String(s) => Ok(s.clone()),
            other => Err(malformed(format!("tag {key}: expected a string, got {other}"))),
        })
        .collect()
}

fn single<'a>(key: &str, values: &'a [String]) -> Result<&'a str> {
    match values {
        [value] => Ok(value),
        _ => Err(malformed(format!("tag {key} takes exactly one value"))),
    }
}

fn parse_u64(key: &str, values: &[String]) -> Result<u64> {
    let value = single(key, values)?;
    value
        .parse()
        .map_err(|_| malformed(format!("tag {key}: not an unsigned integer: {value}")))
}

fn parse_threshold(key: &str, values: &[String]) -> Result<u64> {
    match parse_u64(key, values)? {
        0 => Err(malformed(format!("tag {key} must be at least 1"))),
        n => Ok(n),
    }
}

impl SpendingConditions {
    /// Conditions locked to a single key with default tags.
    pub fn new(data: PublicKey, nonce: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
            data,
            sigflag: SigFlag::SigInputs,
            pubkeys: Vec::new(),
            n_sigs: None,
            locktime: None,
            refund: Vec::new(),
            n_sigs_refund: None,
        }
    }

    /// Conditions locked to `data` with a fresh 32-byte nonce.
    pub fn with_random_nonce<R: RngCore + CryptoRng>(data: PublicKey, rng: &mut R) -> Self {
        let mut nonce = [0u8; 32];
        rng.fill_bytes(&mut nonce);
        Self::new(data, hex::encode(nonce))
    }

    /// Add main-path signers and a threshold.
    pub fn with_multisig(mut self, pubkeys: Vec<PublicKey>, n_sigs: u64) -> Self {
        self.pubkeys = pubkeys;
        self.n_sigs = Some(n_sigs);
        self
    }

    /// Add a locktime and the keys that may spend after it.
    pub fn with_refund(mut self, locktime: u64, refund: Vec<PublicKey>) -> Self {
        self.locktime = Some(locktime);
        self.refund = refund;
        self
    }

    /// Set the refund-path threshold.
    pub fn with_refund_threshold(mut self, n_sigs_refund: u64) -> Self {
        self.n_sigs_refund = Some(n_sigs_refund);
        self
    }

    /// Set the signature scope.
    pub fn with_sigflag(mut self, sigflag: SigFlag) -> Self {
        self.sigflag = sigflag;
        self
    }

    /// Strictly parse the JSON text of a P2PK secret.
    ///
    /// # Errors
    ///
    /// - [`TypesError::MalformedSecret`] if the text is not exactly a
    ///   two-element array `["P2PK", {...}]`, `nonce` or `data` is missing,
    ///   a key does not parse, or a recognised tag is duplicated or malformed
    pub fn from_secret_str(secret: &str) -> Result<Self> {
        let (kind, body): (String, WireData) = serde_json::from_str(secret).map_err(malformed)?;
        if kind != P2PK_KIND {
            return Err(malformed(format!("unexpected kind {kind}")));
        }

        let mut conditions = Self::new(parse_key(&body.data)?, body.nonce);
        let mut seen = BTreeSet::new();

        for entry in body.tags.unwrap_or_default() {
            let Some((key, values)) = entry.split_first() else {
                return Err(malformed("empty tag"));
            };
            // Unknown tags, whatever their shape, are skipped.
            let Some(key) = key.as_str().filter(|k| tag::KNOWN.contains(k)) else {
                continue;
            };
            if !seen.insert(key.to_string()) {
                return Err(malformed(format!("duplicate tag {key}")));
            }
            let values = string_values(key, values)?;
            let values = values.as_slice();

            match key {
                tag::SIGFLAG => conditions.sigflag = SigFlag::from(single(key, values)?),
                tag::PUBKEYS => {
                    conditions.pubkeys = values.iter().map(|v| parse_key(v)).collect::<Result<_>>()?
                }
                tag::N_SIGS => conditions.n_sigs = Some(parse_threshold(key, values)?),
                tag::LOCKTIME => conditions.locktime = Some(parse_u64(key, values)?),
                tag::REFUND => {
                    conditions.refund = values.iter().map(|v| parse_key(v)).collect::<Result<_>>()?
                }
                tag::N_SIGS_REFUND => conditions.n_sigs_refund = Some(parse_threshold(key, values)?),
                _ => {}
            }
        }

        Ok(conditions)
    }

    /// Tags in canonical order. `sigflag` is always present; the others only
    /// when set.
    pub fn tags(&self) -> Vec<Vec<String>> {
        let mut tags = vec![vec![tag::SIGFLAG.to_string(), self.sigflag.as_str().to_string()]];
        if let Some(n) = self.n_sigs {
            tags.push(vec![tag::N_SIGS.to_string(), n.to_string()]);
        }
        if !self.pubkeys.is_empty() {
            tags.push(key_tag(tag::PUBKEYS, &self.pubkeys));
        }
        if let Some(locktime) = self.locktime {
            tags.push(vec![tag::LOCKTIME.to_string(), locktime.to_string()]);
        }
        if !self.refund.is_empty() {
            tags.push(key_tag(tag::REFUND, &self.refund));
        }
        if let Some(n) = self.n_sigs_refund {
            tags.push(vec![tag::N_SIGS_REFUND.to_string(), n.to_string()]);
        }
        tags
    }

    /// Serialise to a new secret: compact JSON, keys in the order
    /// `nonce`, `data`, `tags`.
    pub fn to_secret(&self) -> Result<Secret> {
        let body = WireDataOut {
            nonce: &self.nonce,
            data: self.data.to_hex(),
            tags: self.tags(),
        };
        Ok(Secret::new(serde_json::to_string(&(P2PK_KIND, body))?))
    }
}

fn key_tag(key: &str, keys: &[PublicKey]) -> Vec<String> {
    std::iter::once(key.to_string())
        .chain(keys.iter().map(PublicKey::to_hex))
        .collect()
}
