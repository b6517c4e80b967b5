//! Trust Evaluator
//!
//! CHỈ chứa logic aggregate - không có types, không có policy presets.
//! Input: ProbeSet + PlatformContext + BlockPolicy
//! Output: Verdict

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::context::PlatformContext;
use super::policy::{BlockPolicy, PolicyConfig};
use super::probes::{ProbeError, ProbeSet, ThreatProbe};
use super::types::{ThreatFlags, Verdict};

// ============================================================================
// EVALUATOR
// ============================================================================

/// Probe set plus block policy. Stateless between calls.
pub struct TrustEvaluator {
    probes: ProbeSet,
    policy: Box<dyn BlockPolicy>,
}

impl TrustEvaluator {
    /// Evaluator with the default policy
    pub fn new(probes: ProbeSet) -> Self {
        Self {
            probes,
            policy: Box::new(PolicyConfig::default()),
        }
    }

    pub fn with_policy(mut self, policy: impl BlockPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Run every probe and render one verdict. Never fails.
    pub fn evaluate(&self, context: &PlatformContext) -> Verdict {
        evaluate_with(&self.probes, self.policy.as_ref(), context)
    }
}

// ============================================================================
// MAIN EVALUATION FUNCTION
// ============================================================================

/// Aggregate probes into a verdict and apply `policy`.
///
/// The first probe error (or unwinding panic) turns the whole evaluation into
/// an `ERROR` verdict; partial masks are never reported.
pub fn evaluate_with(
    probes: &ProbeSet,
    policy: &dyn BlockPolicy,
    context: &PlatformContext,
) -> Verdict {
    let mut flags = ThreatFlags::EMPTY;

    for (signal, probe) in probes.iter() {
        match run_probe(probe, context) {
            Ok(true) => {
                log::debug!("Probe '{}' detected {}", probe.name(), signal);
                flags = flags.with(signal);
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("Probe '{}' ({}) failed: {}", probe.name(), signal, e);
                let message = format!(
                    "Trust evaluation failed: {} probe '{}': {}",
                    signal,
                    probe.name(),
                    e
                );
                return decide(Verdict::from_error(message), policy);
            }
        }
    }

    decide(Verdict::from_flags(flags), policy)
}

/// Panics surface as `ProbeError::Failed` when the build unwinds
fn run_probe(probe: &dyn ThreatProbe, context: &PlatformContext) -> Result<bool, ProbeError> {
    panic::catch_unwind(AssertUnwindSafe(|| probe.detect(context)))
        .unwrap_or_else(|payload| Err(ProbeError::Failed(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string payload".to_string());
    format!("panicked: {}", detail)
}

fn decide(verdict: Verdict, policy: &dyn BlockPolicy) -> Verdict {
    let should_block = policy.should_block(&verdict);
    let verdict = verdict.with_decision(policy.name(), should_block);

    log::info!(
        "Trust verdict: band={}, mask={}, block={} (policy {})",
        verdict.band(),
        verdict.mask(),
        verdict.should_block(),
        verdict.policy()
    );

    verdict
}
