//! Platform Context
//!
//! Facts gathered by the platform layer before an evaluation. Probes only
//! read from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// PLATFORM CONTEXT
// ============================================================================

/// Input handed to every probe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformContext {
    /// Platform description, e.g. "android 14"
    pub platform: Option<String>,
    /// Application/package identifier
    pub package_name: Option<String>,
    /// Digest of the signing certificate as installed (hex)
    pub installed_signature: Option<String>,
    /// Digest the build expects (hex)
    pub expected_signature: Option<String>,
    /// Free-form facts (system properties, environment markers)
    pub attributes: BTreeMap<String, String>,
}

impl PlatformContext {
    pub fn new(package_name: &str) -> Self {
        Self {
            package_name: Some(package_name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.to_string());
        self
    }

    pub fn with_signatures(mut self, installed: &str, expected: &str) -> Self {
        self.installed_signature = Some(installed.to_string());
        self.expected_signature = Some(expected.to_string());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
