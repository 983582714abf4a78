//! Mint configuration file.
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [[keysets]]
//! unit = "sat"
//! active = true
//! [keysets.keys]
//! 1 = "<hex secret key>"
//! 2 = "<hex secret key>"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use ecash_crypto::SecretKey;
use ecash_types::Amount;
use serde::{Deserialize, Serialize};

use crate::keyset::{KeysetRegistry, MintKeyset};
use crate::{MintError, Result};

/// Complete mint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MintConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
    /// Keysets to load, in order.
    #[serde(default)]
    pub keysets: Vec<KeysetConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// One keyset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysetConfig {
    /// Currency unit.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Whether the keyset signs new outputs.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Amount (as a decimal string key) to hex secret key.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_unit() -> String {
    "sat".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MintConfig {
    /// Load configuration from `path`.
    ///
    /// Falls back to defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// - [`MintError::Config`] if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| MintError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// - [`MintError::Config`] if the text is not valid configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MintError::Config(e.to_string()))
    }
}

impl KeysetConfig {
    /// Build the keyset described by this entry.
    ///
    /// # Errors
    ///
    /// - [`MintError::Config`] if an amount or key does not parse
    pub fn to_keyset(&self) -> Result<MintKeyset> {
        let keys = self
            .keys
            .iter()
            .map(|(amount, key)| {
                let amount: Amount = amount
                    .parse()
                    .map_err(|_| MintError::Config(format!("invalid amount {amount:?}")))?;
                let key = SecretKey::from_hex(key)
                    .map_err(|e| MintError::Config(format!("key for amount {amount}: {e}")))?;
                Ok((amount, key))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(MintKeyset::from_secret_keys(self.unit.clone(), self.active, keys))
    }
}

impl KeysetRegistry {
    /// Registry holding every keyset in `config`.
    ///
    /// # Errors
    ///
    /// - [`MintError::Config`] if any keyset entry is invalid
    pub fn from_config(config: &MintConfig) -> Result<Self> {
        let mut registry = Self::new();
        for keyset in &config.keysets {
            registry.insert(keyset.to_keyset()?);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[log]
level = "debug"

[[keysets]]
unit = "sat"
[keysets.keys]
1 = "0000000000000000000000000000000000000000000000000000000000000001"
2 = "0000000000000000000000000000000000000000000000000000000000000002"

[[keysets]]
unit = "usd"
active = false
[keysets.keys]
1 = "0000000000000000000000000000000000000000000000000000000000000003"
"#;

    #[test]
    fn test_default_config() {
        let config = MintConfig::default();
        assert_eq!(config.log.level, "info");
        assert!(config.keysets.is_empty());

        let empty = MintConfig::from_toml_str("").expect("empty");
        assert_eq!(empty.log.level, "info");
        assert!(KeysetRegistry::from_config(&empty).expect("registry").is_empty());
    }

    #[test]
    fn test_parse_and_build_registry() {
        let config = MintConfig::from_toml_str(CONFIG).expect("parse");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.keysets.len(), 2);
        assert!(config.keysets[0].active);
        assert!(!config.keysets[1].active);

        let registry = KeysetRegistry::from_config(&config).expect("registry");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_keysets().count(), 1);

        let sat = config.keysets[0].to_keyset().expect("sat");
        let k1 = registry.keypair(&sat.id(), 1).expect("amount 1");
        assert_eq!(
            k1.public_key.to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_invalid_entries() {
        for bad in [
            "[[keysets]]\n[keysets.keys]\none = \"0000000000000000000000000000000000000000000000000000000000000001\"\n",
            "[[keysets]]\n[keysets.keys]\n1 = \"00\"\n",
            "[[keysets]]\n[keysets.keys]\n1 = \"0000000000000000000000000000000000000000000000000000000000000000\"\n",
        ] {
            let config = MintConfig::from_toml_str(bad).expect("parse");
            assert!(matches!(
                KeysetRegistry::from_config(&config),
                Err(MintError::Config(_))
            ));
        }

        assert!(matches!(
            MintConfig::from_toml_str("[log]\nlevel = 3\n"),
            Err(MintError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("ecash-mint-config-does-not-exist.toml");
        let config = MintConfig::load(&path).expect("load");
        assert!(config.keysets.is_empty());
    }
}
