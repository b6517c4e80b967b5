//! Configuration module
//!
//! Environment-driven settings. The key is read once at startup and handed
//! to an [`EnvelopeCodec`]; nothing here is global.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{DEFAULT_BLOCK_POLICY, ENV_BLOCK_POLICY, ENV_ENVELOPE_KEY, ENV_KEY_FILE};
use crate::logic::envelope::{EnvelopeCodec, KeyMaterial, KEY_LEN};
use crate::logic::trust::PolicyConfig;

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no envelope key configured (set {} or {})", ENV_ENVELOPE_KEY, ENV_KEY_FILE)]
    MissingKey,

    #[error("cannot read key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid envelope key: {0}")]
    InvalidKey(String),

    #[error("unknown block policy '{0}' (expected default, permissive or strict)")]
    UnknownPolicy(String),
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Base64 envelope key, takes precedence over `key_file`
    pub envelope_key: Option<String>,

    /// File containing the Base64 envelope key
    pub key_file: Option<PathBuf>,

    /// Block policy preset name
    pub block_policy: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            envelope_key: non_empty(ENV_ENVELOPE_KEY),

            key_file: non_empty(ENV_KEY_FILE).map(PathBuf::from),

            block_policy: non_empty(ENV_BLOCK_POLICY)
                .unwrap_or_else(|| DEFAULT_BLOCK_POLICY.to_string()),
        }
    }

    /// Key material as configured, without validating its length
    pub fn key_material(&self) -> Result<KeyMaterial, ConfigError> {
        if let Some(encoded) = &self.envelope_key {
            return Ok(KeyMaterial::from_base64(encoded));
        }

        if let Some(path) = &self.key_file {
            let encoded = fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
                path: path.clone(),
                source,
            })?;
            return Ok(KeyMaterial::from_base64(&encoded));
        }

        Err(ConfigError::MissingKey)
    }

    /// Codec for the configured key. Fails fast on a malformed key.
    pub fn envelope_codec(&self) -> Result<EnvelopeCodec, ConfigError> {
        let key = self.key_material()?;

        if !key.is_valid() {
            let detail = match key.len() {
                Some(len) => format!("expected {} bytes, got {}", KEY_LEN, len),
                None => "not valid base64".to_string(),
            };
            return Err(ConfigError::InvalidKey(detail));
        }

        log::info!(
            "Envelope key loaded (fingerprint {})",
            key.fingerprint().unwrap_or_default()
        );

        Ok(EnvelopeCodec::new(key))
    }

    /// Block policy preset
    pub fn block_policy(&self) -> Result<PolicyConfig, ConfigError> {
        PolicyConfig::from_name(&self.block_policy)
            .ok_or_else(|| ConfigError::UnknownPolicy(self.block_policy.clone()))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("envelope_key", &self.envelope_key.as_ref().map(|_| "<redacted>"))
            .field("key_file", &self.key_file)
            .field("block_policy", &self.block_policy)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
