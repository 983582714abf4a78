//! Test vector generator for the ecash core.
//!
//! Generates `test_vectors.json` with deterministic vectors for every
//! primitive other wallets and mints must agree on: hash-to-curve, BDHKE with
//! fixed blinding factors, DLEQ with a fixed nonce, BIP-340 over SHA-256 with
//! zero auxiliary randomness, adaptor signatures with a fixed nonce, and
//! keyset id derivation.
//!
//! Usage:
//!   ecash-testvec                        # Generate test_vectors.json
//!   ecash-testvec --verify               # Verify test vectors match expected values
//!   ecash-testvec --config mint.toml     # Also emit ids of the configured keysets

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ecash_crypto::hash_to_curve::{hash_to_curve, DOMAIN_SEPARATOR};
use ecash_crypto::{adaptor, dhke, dleq, schnorr, PublicKey, SecretKey};
use ecash_mint::config::MintConfig;
use ecash_types::KeysetId;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const VECTORS_PATH: &str = "tests/fixtures/test_vectors.json";

#[derive(Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

/// Scalar with only the low byte set.
fn small_scalar(low: u8) -> anyhow::Result<SecretKey> {
    let mut bytes = [0u8; 32];
    bytes[31] = low;
    Ok(SecretKey::from_slice(&bytes)?)
}

fn generate_hash_to_curve_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    for last in 0u8..3 {
        let mut message = [0u8; 32];
        message[31] = last;
        let y = hash_to_curve(&message)?;
        vectors.insert(
            format!("hash_to_curve_{last}"),
            TestVector {
                description: format!(
                    "hash_to_curve(0x00*31 || {last:#04x}) with separator {:?}",
                    String::from_utf8_lossy(DOMAIN_SEPARATOR)
                ),
                inputs: BTreeMap::from([("message".to_string(), hex::encode(message))]),
                outputs: BTreeMap::from([("Y".to_string(), y.to_hex())]),
            },
        );
    }

    Ok(vectors)
}

fn generate_bdhke_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let secret = b"test_message";
    let r = small_scalar(1)?;
    let k = small_scalar(2)?;
    let mint_pubkey = k.public_key();

    let blinded = dhke::blind_with_factor(secret, &r)?;
    let signed = dhke::sign_point(&k, &blinded)?;
    let unblinded = dhke::unblind(&signed, &r, &mint_pubkey)?;

    vectors.insert(
        "bdhke_round_trip".to_string(),
        TestVector {
            description: "B_ = Y + rG, C_ = kB_, C = C_ - rK with r = 1, k = 2".to_string(),
            inputs: BTreeMap::from([
                ("secret".to_string(), String::from_utf8_lossy(secret).into_owned()),
                ("r".to_string(), r.to_hex()),
                ("k".to_string(), k.to_hex()),
            ]),
            outputs: BTreeMap::from([
                ("B_".to_string(), blinded.to_hex()),
                ("C_".to_string(), signed.to_hex()),
                ("C".to_string(), unblinded.to_hex()),
                ("K".to_string(), mint_pubkey.to_hex()),
            ]),
        },
    );

    Ok(vectors)
}

fn generate_dleq_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let k = small_scalar(1)?;
    let nonce = small_scalar(2)?;
    let blinded = hash_to_curve(&[0u8; 32])?;
    let signed = dhke::sign_point(&k, &blinded)?;
    let proof = dleq::generate_with_nonce(&k, &blinded, &signed, &nonce)?;

    vectors.insert(
        "dleq_fixed_nonce".to_string(),
        TestVector {
            description: "DLEQ proof for k = 1, p = 2, B_ = hash_to_curve(0x00*32)".to_string(),
            inputs: BTreeMap::from([
                ("k".to_string(), k.to_hex()),
                ("p".to_string(), nonce.to_hex()),
                ("B_".to_string(), blinded.to_hex()),
            ]),
            outputs: BTreeMap::from([
                ("C_".to_string(), signed.to_hex()),
                ("e".to_string(), hex::encode(proof.e)),
                ("s".to_string(), hex::encode(proof.s)),
            ]),
        },
    );

    Ok(vectors)
}

fn generate_schnorr_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let key = small_scalar(3)?;
    let message = br#"["P2PK",{"nonce":"00","data":"02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9","tags":[["sigflag","SIG_INPUTS"]]}]"#;
    let signature = schnorr::sign_message(&key, message, &[0u8; 32]);

    vectors.insert(
        "schnorr_zero_aux".to_string(),
        TestVector {
            description: "BIP-340 over SHA-256(message) with sk = 3 and aux_rand = 0x00*32"
                .to_string(),
            inputs: BTreeMap::from([
                ("secret_key".to_string(), key.to_hex()),
                ("message".to_string(), String::from_utf8_lossy(message).into_owned()),
            ]),
            outputs: BTreeMap::from([
                ("public_key".to_string(), key.public_key().to_hex()),
                ("digest".to_string(), hex::encode(schnorr::message_digest(message))),
                ("signature".to_string(), signature.to_hex()),
            ]),
        },
    );

    Ok(vectors)
}

fn generate_adaptor_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let key = small_scalar(3)?;
    let t = small_scalar(5)?;
    let nonce = small_scalar(7)?;
    let message = b"cashu atomic swap";

    let encrypted = adaptor::encrypted_sign_with_nonce(&key, &t.public_key(), message, &nonce)?;
    let signature = adaptor::decrypt(&t, &encrypted)?;
    let tweaked = adaptor::tweak_public_key(&key.public_key(), &t.public_key())?;

    vectors.insert(
        "adaptor_fixed_nonce".to_string(),
        TestVector {
            description: "adaptor signature with sk = 3, t = 5, r = 7, decrypted to BIP-340"
                .to_string(),
            inputs: BTreeMap::from([
                ("secret_key".to_string(), key.to_hex()),
                ("adaptor_secret".to_string(), t.to_hex()),
                ("nonce".to_string(), nonce.to_hex()),
                ("message".to_string(), String::from_utf8_lossy(message).into_owned()),
            ]),
            outputs: BTreeMap::from([
                ("T".to_string(), t.public_key().to_hex()),
                ("R".to_string(), encrypted.r.to_hex()),
                ("s_encrypted".to_string(), hex::encode(encrypted.s)),
                ("needs_negation".to_string(), encrypted.needs_negation.to_string()),
                ("signature".to_string(), signature.to_hex()),
                ("tweaked_public_key".to_string(), tweaked.to_hex()),
            ]),
        },
    );

    Ok(vectors)
}

fn generate_keyset_id_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let keys = [
        (1u64, "03a40f20667ed53513075dc51e715ff2046cad64eb68960632269ba7f0210e38bc"),
        (2, "03fd4ce5a16b65576145949e6f99f445f8249fee17c606b688b504a849cdc452de"),
        (4, "02648eccfa4c026960966276fa5a4cae46ce0fd432211a4f449bf84f13aa5f8303"),
        (8, "02fdfd6796bfeac490cbee12f778f867f0a2c68f6508d17c649759ea0dc3547528"),
    ];
    let parsed = keys
        .iter()
        .map(|(amount, key)| Ok((*amount, PublicKey::from_hex(key)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let id = KeysetId::from_keys(parsed.iter().map(|(amount, key)| (*amount, key)));

    vectors.insert(
        "keyset_id_v00".to_string(),
        TestVector {
            description: "0x00 || SHA-256(K_1 || K_2 || K_4 || K_8)[0..7]".to_string(),
            inputs: keys
                .iter()
                .map(|(amount, key)| (amount.to_string(), key.to_string()))
                .collect(),
            outputs: BTreeMap::from([("id".to_string(), id.to_hex())]),
        },
    );

    Ok(vectors)
}

fn generate_config_vectors(config: &MintConfig) -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    for (index, entry) in config.keysets.iter().enumerate() {
        let keyset = entry.to_keyset()?;
        vectors.insert(
            format!("config_keyset_{index}"),
            TestVector {
                description: format!("id of configured keyset #{index} ({})", keyset.unit()),
                inputs: keyset
                    .public_keys()
                    .iter()
                    .map(|(amount, key)| (amount.to_string(), key.to_hex()))
                    .collect(),
                outputs: BTreeMap::from([("id".to_string(), keyset.id().to_hex())]),
            },
        );
    }

    Ok(vectors)
}

fn generate_all_vectors(config: Option<&MintConfig>) -> anyhow::Result<TestVectors> {
    let mut all_vectors = BTreeMap::new();

    all_vectors.extend(generate_hash_to_curve_vectors()?);
    all_vectors.extend(generate_bdhke_vectors()?);
    all_vectors.extend(generate_dleq_vectors()?);
    all_vectors.extend(generate_schnorr_vectors()?);
    all_vectors.extend(generate_adaptor_vectors()?);
    all_vectors.extend(generate_keyset_id_vectors()?);
    if let Some(config) = config {
        all_vectors.extend(generate_config_vectors(config)?);
    }

    Ok(TestVectors {
        version: "1.0".to_string(),
        generated_by: "ecash-testvec".to_string(),
        vectors: all_vectors,
    })
}

fn verify_vectors(vectors: &TestVectors, config: Option<&MintConfig>) -> anyhow::Result<bool> {
    let regenerated = generate_all_vectors(config)?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        match regenerated.vectors.get(name) {
            Some(actual) if actual.outputs == expected.outputs => {
                tracing::info!(vector = %name, "PASS");
            }
            Some(actual) => {
                tracing::error!(
                    vector = %name,
                    expected = ?expected.outputs,
                    actual = ?actual.outputs,
                    "FAIL"
                );
                all_pass = false;
            }
            None => {
                tracing::error!(vector = %name, "MISSING");
                all_pass = false;
            }
        }
    }

    Ok(all_pass)
}

fn write_vectors(path: &Path, vectors: &TestVectors) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(vectors)?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn config_arg(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let config = config_arg(&args)
        .map(|path| MintConfig::load(&path))
        .transpose()?;

    let level = config
        .as_ref()
        .map_or("info", |c| c.log.level.as_str())
        .to_string();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("ecash={level}"))),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = Path::new(VECTORS_PATH);

    if args.iter().any(|a| a == "--verify") {
        // Verify mode: load existing vectors and check
        if let Ok(content) = std::fs::read_to_string(path) {
            let vectors: TestVectors =
                serde_json::from_str(&content).with_context(|| format!("parse {VECTORS_PATH}"))?;
            if !verify_vectors(&vectors, config.as_ref())? {
                anyhow::bail!("test vector verification failed");
            }
            tracing::info!("all test vectors verified successfully");
            return Ok(());
        }
        tracing::warn!(path = VECTORS_PATH, "no existing test vectors, generating");
    }

    // Generate mode: produce test_vectors.json
    let vectors = generate_all_vectors(config.as_ref())?;
    write_vectors(path, &vectors)?;
    tracing::info!(count = vectors.vectors.len(), path = VECTORS_PATH, "generated test vectors");

    // Self-verify
    if !verify_vectors(&vectors, config.as_ref())? {
        anyhow::bail!("self-verification failed");
    }
    tracing::info!("self-verification passed");
    Ok(())
}
