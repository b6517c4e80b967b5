//! Trust Types
//!
//! Signals, bitmask, severity band and verdict.
//! Classification ladder lives here; probe execution does not.

use std::fmt;
use std::ops::BitOr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rules::{
    ALL_BITS, CRITICAL_MIN, DANGER_MIN, DEBUG_BIT, ERROR_SENTINEL, INSTRUMENTATION_BIT,
    INTEGRITY_BIT, NO_THREATS_MESSAGE, ROOT_BIT, SUMMARY_SEPARATOR, WARNING_MIN,
};

// ============================================================================
// THREAT SIGNAL
// ============================================================================

/// One independent threat signal, each owning a single bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatSignal {
    Root,
    Debug,
    Instrumentation,
    Integrity,
}

impl ThreatSignal {
    /// In bit order
    pub const ALL: [ThreatSignal; 4] = [
        ThreatSignal::Root,
        ThreatSignal::Debug,
        ThreatSignal::Instrumentation,
        ThreatSignal::Integrity,
    ];

    pub fn bit(&self) -> u8 {
        match self {
            ThreatSignal::Root => ROOT_BIT,
            ThreatSignal::Debug => DEBUG_BIT,
            ThreatSignal::Instrumentation => INSTRUMENTATION_BIT,
            ThreatSignal::Integrity => INTEGRITY_BIT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatSignal::Root => "root",
            ThreatSignal::Debug => "debug",
            ThreatSignal::Instrumentation => "instrumentation",
            ThreatSignal::Integrity => "integrity",
        }
    }

    /// Human-readable name used in verdict summaries
    pub fn label(&self) -> &'static str {
        match self {
            ThreatSignal::Root => "Root access detected",
            ThreatSignal::Debug => "Debugger attached",
            ThreatSignal::Instrumentation => "Instrumentation framework detected",
            ThreatSignal::Integrity => "App integrity compromised",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ThreatSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT FLAGS (bitmask)
// ============================================================================

/// Bitmask of detected signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreatFlags(u8);

impl ThreatFlags {
    pub const EMPTY: ThreatFlags = ThreatFlags(0);
    pub const ROOT: ThreatFlags = ThreatFlags(ROOT_BIT);
    pub const DEBUG: ThreatFlags = ThreatFlags(DEBUG_BIT);
    pub const INSTRUMENTATION: ThreatFlags = ThreatFlags(INSTRUMENTATION_BIT);
    pub const INTEGRITY: ThreatFlags = ThreatFlags(INTEGRITY_BIT);

    /// Unknown bits are dropped
    pub fn from_bits_truncate(bits: u8) -> Self {
        ThreatFlags(bits & ALL_BITS)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, signal: ThreatSignal) -> bool {
        self.0 & signal.bit() != 0
    }

    pub fn with(self, signal: ThreatSignal) -> Self {
        ThreatFlags(self.0 | signal.bit())
    }

    /// Set signals in bit order
    pub fn signals(&self) -> impl Iterator<Item = ThreatSignal> + '_ {
        ThreatSignal::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl From<ThreatSignal> for ThreatFlags {
    fn from(signal: ThreatSignal) -> Self {
        ThreatFlags(signal.bit())
    }
}

impl BitOr for ThreatFlags {
    type Output = ThreatFlags;

    fn bitor(self, rhs: ThreatFlags) -> ThreatFlags {
        ThreatFlags(self.0 | rhs.0)
    }
}

impl FromIterator<ThreatSignal> for ThreatFlags {
    fn from_iter<I: IntoIterator<Item = ThreatSignal>>(iter: I) -> Self {
        iter.into_iter().fold(ThreatFlags::EMPTY, ThreatFlags::with)
    }
}

// ============================================================================
// SEVERITY BAND
// ============================================================================

/// Ordinal severity derived from the mask.
///
/// `Error` sits outside the ladder: it means "trust status unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityBand {
    Safe,
    Warning,
    Danger,
    Critical,
    Error,
}

impl SeverityBand {
    /// Fixed threshold ladder; any negative mask is the error sentinel
    pub fn from_mask(mask: i32) -> Self {
        if mask < 0 {
            SeverityBand::Error
        } else if mask < WARNING_MIN {
            SeverityBand::Safe
        } else if mask < DANGER_MIN {
            SeverityBand::Warning
        } else if mask < CRITICAL_MIN {
            SeverityBand::Danger
        } else {
            SeverityBand::Critical
        }
    }

    /// Position on the ladder, `None` for `Error`
    pub fn rank(&self) -> Option<u8> {
        match self {
            SeverityBand::Safe => Some(0),
            SeverityBand::Warning => Some(1),
            SeverityBand::Danger => Some(2),
            SeverityBand::Critical => Some(3),
            SeverityBand::Error => None,
        }
    }

    /// Ladder comparison; always false when either side is `Error`
    pub fn is_at_least(&self, other: SeverityBand) -> bool {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => a >= b,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityBand::Safe => "SAFE",
            SeverityBand::Warning => "WARNING",
            SeverityBand::Danger => "DANGER",
            SeverityBand::Critical => "CRITICAL",
            SeverityBand::Error => "ERROR",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        [
            SeverityBand::Safe,
            SeverityBand::Warning,
            SeverityBand::Danger,
            SeverityBand::Critical,
            SeverityBand::Error,
        ]
        .into_iter()
        .find(|b| b.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn color(&self) -> &'static str {
        match self {
            SeverityBand::Safe => "#10b981",     // Green
            SeverityBand::Warning => "#f59e0b",  // Yellow
            SeverityBand::Danger => "#f97316",   // Orange
            SeverityBand::Critical => "#ef4444", // Red
            SeverityBand::Error => "#6b7280",    // Gray
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Result of one evaluation. Built fresh per call, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    mask: i32,
    rooted: bool,
    debugger_attached: bool,
    instrumented: bool,
    tampered: bool,
    band: SeverityBand,
    summary: String,
    should_block: bool,
    error: Option<String>,
    policy: String,
    evaluated_at: DateTime<Utc>,
}

impl Verdict {
    /// Verdict for a completed evaluation, before any policy ran
    pub fn from_flags(flags: ThreatFlags) -> Self {
        let mask = i32::from(flags.bits());
        let summary = if flags.is_empty() {
            NO_THREATS_MESSAGE.to_string()
        } else {
            flags
                .signals()
                .map(|s| s.label())
                .collect::<Vec<_>>()
                .join(SUMMARY_SEPARATOR)
        };

        Self {
            mask,
            rooted: flags.contains(ThreatSignal::Root),
            debugger_attached: flags.contains(ThreatSignal::Debug),
            instrumented: flags.contains(ThreatSignal::Instrumentation),
            tampered: flags.contains(ThreatSignal::Integrity),
            band: SeverityBand::from_mask(mask),
            summary,
            should_block: false,
            error: None,
            policy: String::new(),
            evaluated_at: Utc::now(),
        }
    }

    /// Verdict for an evaluation that could not complete
    pub fn from_error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            mask: ERROR_SENTINEL,
            rooted: false,
            debugger_attached: false,
            instrumented: false,
            tampered: false,
            band: SeverityBand::from_mask(ERROR_SENTINEL),
            summary: message.clone(),
            should_block: false,
            error: Some(message),
            policy: String::new(),
            evaluated_at: Utc::now(),
        }
    }

    pub(crate) fn with_decision(mut self, policy: &str, should_block: bool) -> Self {
        self.policy = policy.to_string();
        self.should_block = should_block;
        self
    }

    /// Raw mask, `-1` when evaluation failed
    pub fn mask(&self) -> i32 {
        self.mask
    }

    /// Typed mask, `None` when evaluation failed
    pub fn flags(&self) -> Option<ThreatFlags> {
        u8::try_from(self.mask).ok().map(ThreatFlags::from_bits_truncate)
    }

    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    pub fn is_debugger_attached(&self) -> bool {
        self.debugger_attached
    }

    pub fn is_instrumented(&self) -> bool {
        self.instrumented
    }

    pub fn is_tampered(&self) -> bool {
        self.tampered
    }

    pub fn band(&self) -> SeverityBand {
        self.band
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn should_block(&self) -> bool {
        self.should_block
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Name of the policy that made the block decision
    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }
}

// ============================================================================
// TESTS
// ============================================================================
