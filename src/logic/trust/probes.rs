//! Threat Probes
//!
//! One boolean capability per signal. Real platform sensing plugs in by
//! implementing [`ThreatProbe`]; the stock adapters here only read the
//! [`PlatformContext`] they are given.

use thiserror::Error;

use super::context::PlatformContext;
use super::types::ThreatSignal;

// ============================================================================
// PROBE TRAIT
// ============================================================================

/// Why a probe could not produce an answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Required platform facts are missing
    #[error("platform context unavailable: {0}")]
    ContextUnavailable(String),

    /// Probe ran but failed
    #[error("probe failed: {0}")]
    Failed(String),
}

/// Independent, side-effect-free threat check
///
/// Report failures through `Err`. A panic is caught and reported as a failure
/// only when the build unwinds; under `panic = "abort"` it ends the process.
pub trait ThreatProbe: Send + Sync {
    fn name(&self) -> &str;
    fn detect(&self, context: &PlatformContext) -> Result<bool, ProbeError>;
}

// ============================================================================
// BUILT-IN PROBES
// ============================================================================

/// Fixed outcome, for platforms without real sensing yet
pub struct StaticProbe {
    name: String,
    detected: bool,
}

impl StaticProbe {
    pub fn new(name: &str, detected: bool) -> Self {
        Self {
            name: name.to_string(),
            detected,
        }
    }

    pub fn clear(name: &str) -> Self {
        Self::new(name, false)
    }

    pub fn detected(name: &str) -> Self {
        Self::new(name, true)
    }
}

impl ThreatProbe for StaticProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, _context: &PlatformContext) -> Result<bool, ProbeError> {
        Ok(self.detected)
    }
}

/// Closure-backed probe
pub struct FnProbe<F> {
    name: String,
    check: F,
}

impl<F> FnProbe<F>
where
    F: Fn(&PlatformContext) -> Result<bool, ProbeError> + Send + Sync,
{
    pub fn new(name: &str, check: F) -> Self {
        Self {
            name: name.to_string(),
            check,
        }
    }
}

impl<F> ThreatProbe for FnProbe<F>
where
    F: Fn(&PlatformContext) -> Result<bool, ProbeError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, context: &PlatformContext) -> Result<bool, ProbeError> {
        (self.check)(context)
    }
}

/// Flags when a context attribute holds one of the suspicious values
pub struct AttributeProbe {
    name: String,
    key: String,
    suspicious_values: Vec<String>,
    required: bool,
}

impl AttributeProbe {
    pub fn new(name: &str, key: &str, suspicious_values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
            suspicious_values: suspicious_values.iter().map(|v| v.to_string()).collect(),
            required: false,
        }
    }

    /// Missing attribute becomes an error instead of "not detected"
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl ThreatProbe for AttributeProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, context: &PlatformContext) -> Result<bool, ProbeError> {
        match context.attribute(&self.key) {
            Some(value) => Ok(self
                .suspicious_values
                .iter()
                .any(|s| s.eq_ignore_ascii_case(value.trim()))),
            None if self.required => Err(ProbeError::ContextUnavailable(format!(
                "attribute '{}' not provided",
                self.key
            ))),
            None => Ok(false),
        }
    }
}

/// Installed signing digest must match the expected one
pub struct SignatureDigestProbe;

impl ThreatProbe for SignatureDigestProbe {
    fn name(&self) -> &str {
        "signature_digest"
    }

    fn detect(&self, context: &PlatformContext) -> Result<bool, ProbeError> {
        let installed = context.installed_signature.as_deref().ok_or_else(|| {
            ProbeError::ContextUnavailable("installed signature digest missing".to_string())
        })?;
        let expected = context.expected_signature.as_deref().ok_or_else(|| {
            ProbeError::ContextUnavailable("expected signature digest missing".to_string())
        })?;

        Ok(normalize_digest(installed) != normalize_digest(expected))
    }
}

/// Hex digests compare case-insensitively, ignoring `:` separators
fn normalize_digest(digest: &str) -> String {
    digest
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ============================================================================
// PROBE SET
// ============================================================================

/// Exactly one probe per signal
pub struct ProbeSet {
    root: Box<dyn ThreatProbe>,
    debug: Box<dyn ThreatProbe>,
    instrumentation: Box<dyn ThreatProbe>,
    integrity: Box<dyn ThreatProbe>,
}

impl ProbeSet {
    pub fn new(
        root: impl ThreatProbe + 'static,
        debug: impl ThreatProbe + 'static,
        instrumentation: impl ThreatProbe + 'static,
        integrity: impl ThreatProbe + 'static,
    ) -> Self {
        Self {
            root: Box::new(root),
            debug: Box::new(debug),
            instrumentation: Box::new(instrumentation),
            integrity: Box::new(integrity),
        }
    }

    /// Static probes only; signals listed in `detected` report true
    pub fn fixed(detected: impl IntoIterator<Item = ThreatSignal>) -> Self {
        let detected: Vec<ThreatSignal> = detected.into_iter().collect();
        let probe =
            |signal: ThreatSignal| StaticProbe::new(signal.as_str(), detected.contains(&signal));
        Self::new(
            probe(ThreatSignal::Root),
            probe(ThreatSignal::Debug),
            probe(ThreatSignal::Instrumentation),
            probe(ThreatSignal::Integrity),
        )
    }

    /// Replace the probe for one signal
    pub fn with_probe(mut self, signal: ThreatSignal, probe: impl ThreatProbe + 'static) -> Self {
        *self.slot_mut(signal) = Box::new(probe);
        self
    }

    pub fn probe(&self, signal: ThreatSignal) -> &dyn ThreatProbe {
        match signal {
            ThreatSignal::Root => self.root.as_ref(),
            ThreatSignal::Debug => self.debug.as_ref(),
            ThreatSignal::Instrumentation => self.instrumentation.as_ref(),
            ThreatSignal::Integrity => self.integrity.as_ref(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThreatSignal, &dyn ThreatProbe)> + '_ {
        ThreatSignal::ALL
            .into_iter()
            .map(move |signal| (signal, self.probe(signal)))
    }

    fn slot_mut(&mut self, signal: ThreatSignal) -> &mut Box<dyn ThreatProbe> {
        match signal {
            ThreatSignal::Root => &mut self.root,
            ThreatSignal::Debug => &mut self.debug,
            ThreatSignal::Instrumentation => &mut self.instrumentation,
            ThreatSignal::Integrity => &mut self.integrity,
        }
    }
}

impl Default for ProbeSet {
    fn default() -> Self {
        Self::fixed(std::iter::empty())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_probe() {
        let ctx = PlatformContext::default();
        assert_eq!(StaticProbe::detected("root").detect(&ctx), Ok(true));
        assert_eq!(StaticProbe::clear("root").detect(&ctx), Ok(false));
    }

    #[test]
    fn test_attribute_probe() {
        let probe = AttributeProbe::new("debuggable", "ro.debuggable", &["1", "true"]);

        let flagged = PlatformContext::default().with_attribute("ro.debuggable", "TRUE");
        assert_eq!(probe.detect(&flagged), Ok(true));

        let clean = PlatformContext::default().with_attribute("ro.debuggable", "0");
        assert_eq!(probe.detect(&clean), Ok(false));

        assert_eq!(probe.detect(&PlatformContext::default()), Ok(false));
    }

    #[test]
    fn test_required_attribute_missing_is_error() {
        let probe = AttributeProbe::new("debuggable", "ro.debuggable", &["1"]).required();
        assert!(matches!(
            probe.detect(&PlatformContext::default()),
            Err(ProbeError::ContextUnavailable(_))
        ));
    }

    #[test]
    fn test_signature_digest_probe() {
        let matching = PlatformContext::default().with_signatures("AB:CD:EF", "abcdef");
        assert_eq!(SignatureDigestProbe.detect(&matching), Ok(false));

        let tampered = PlatformContext::default().with_signatures("abcdee", "abcdef");
        assert_eq!(SignatureDigestProbe.detect(&tampered), Ok(true));

        assert!(matches!(
            SignatureDigestProbe.detect(&PlatformContext::default()),
            Err(ProbeError::ContextUnavailable(_))
        ));
    }

    #[test]
    fn test_fn_probe() {
        let probe = FnProbe::new("platform_known", |ctx: &PlatformContext| {
            ctx.platform
                .as_ref()
                .map(|_| false)
                .ok_or_else(|| ProbeError::Failed("no platform".to_string()))
        });

        assert_eq!(probe.detect(&PlatformContext::default().with_platform("ios 17")), Ok(false));
        assert!(probe.detect(&PlatformContext::default()).is_err());
    }

    #[test]
    fn test_probe_set_fixed_and_override() {
        let ctx = PlatformContext::default();
        let set = ProbeSet::fixed([ThreatSignal::Debug])
            .with_probe(ThreatSignal::Integrity, StaticProbe::detected("integrity_stub"));

        let results: Vec<(ThreatSignal, bool)> = set
            .iter()
            .map(|(signal, probe)| (signal, probe.detect(&ctx).unwrap()))
            .collect();

        assert_eq!(
            results,
            vec![
                (ThreatSignal::Root, false),
                (ThreatSignal::Debug, true),
                (ThreatSignal::Instrumentation, false),
                (ThreatSignal::Integrity, true),
            ]
        );
        assert_eq!(set.probe(ThreatSignal::Integrity).name(), "integrity_stub");
    }
}
