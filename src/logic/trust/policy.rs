//! Block Policy
//!
//! Decides block / allow from a finished verdict. Pure function of the
//! verdict state; swap the policy without touching classification.

use serde::{Deserialize, Serialize};

use super::types::{SeverityBand, Verdict};

// ============================================================================
// POLICY TRAIT
// ============================================================================

/// Pluggable block decision
pub trait BlockPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Must only read the verdict's classification, never its prior decision
    fn should_block(&self, verdict: &Verdict) -> bool;
}

// ============================================================================
// POLICY CONFIG (built-in presets)
// ============================================================================

/// Threshold policy (can be loaded from config)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Block at or above this band; `None` never blocks a completed evaluation
    pub block_threshold: Option<SeverityBand>,
    /// Block when evaluation failed (trust status unknown)
    pub block_on_error: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            block_threshold: Some(SeverityBand::Danger),
            block_on_error: true,
        }
    }
}

impl PolicyConfig {
    /// Never block, even on error
    pub fn permissive() -> Self {
        Self {
            block_threshold: None,
            block_on_error: false,
        }
    }

    /// Any signal blocks
    pub fn strict() -> Self {
        Self {
            block_threshold: Some(SeverityBand::Warning),
            block_on_error: true,
        }
    }

    /// Preset by name: `default`, `permissive`, `strict`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::default()),
            "permissive" => Some(Self::permissive()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }
}

impl BlockPolicy for PolicyConfig {
    fn name(&self) -> &str {
        if *self == Self::permissive() {
            "permissive"
        } else if *self == Self::strict() {
            "strict"
        } else if *self == Self::default() {
            "default"
        } else {
            "custom"
        }
    }

    fn should_block(&self, verdict: &Verdict) -> bool {
        if verdict.band() == SeverityBand::Error {
            return self.block_on_error;
        }
        self.block_threshold
            .map_or(false, |threshold| verdict.band().is_at_least(threshold))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::trust::types::ThreatFlags;

    #[test]
    fn test_default_policy() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.name(), "default");
        assert!(!policy.should_block(&Verdict::from_flags(ThreatFlags::EMPTY)));
        assert!(!policy.should_block(&Verdict::from_flags(ThreatFlags::DEBUG)));
        assert!(policy.should_block(&Verdict::from_flags(ThreatFlags::INSTRUMENTATION)));
        assert!(policy.should_block(&Verdict::from_flags(ThreatFlags::INTEGRITY)));
        assert!(policy.should_block(&Verdict::from_error("probe crashed")));
    }

    #[test]
    fn test_permissive_policy_never_blocks() {
        let policy = PolicyConfig::permissive();
        for bits in 0..16u8 {
            let verdict = Verdict::from_flags(ThreatFlags::from_bits_truncate(bits));
            assert!(!policy.should_block(&verdict));
        }
        assert!(!policy.should_block(&Verdict::from_error("probe crashed")));
    }

    #[test]
    fn test_strict_policy_blocks_any_signal() {
        let policy = PolicyConfig::strict();
        assert!(!policy.should_block(&Verdict::from_flags(ThreatFlags::EMPTY)));
        assert!(policy.should_block(&Verdict::from_flags(ThreatFlags::ROOT)));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PolicyConfig::from_name("STRICT"), Some(PolicyConfig::strict()));
        assert_eq!(PolicyConfig::from_name(" permissive "), Some(PolicyConfig::permissive()));
        assert_eq!(PolicyConfig::from_name("default"), Some(PolicyConfig::default()));
        assert_eq!(PolicyConfig::from_name("paranoid"), None);
    }

    #[test]
    fn test_custom_config_name() {
        let policy = PolicyConfig {
            block_threshold: Some(SeverityBand::Critical),
            block_on_error: false,
        };
        assert_eq!(policy.name(), "custom");
        assert!(!policy.should_block(&Verdict::from_flags(ThreatFlags::INSTRUMENTATION)));
        assert!(policy.should_block(&Verdict::from_flags(ThreatFlags::INTEGRITY)));
    }
}
