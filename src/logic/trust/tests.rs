use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use super::context::PlatformContext;
use super::evaluator::{evaluate_with, TrustEvaluator};
use super::policy::{BlockPolicy, PolicyConfig};
use super::probes::{
    FnProbe, ProbeError, ProbeSet, SignatureDigestProbe, StaticProbe, ThreatProbe,
};
use super::rules::NO_THREATS_MESSAGE;
use super::types::{SeverityBand, ThreatSignal, Verdict};

fn failing_probe() -> impl ThreatProbe {
    FnProbe::new("frida_scan", |_ctx: &PlatformContext| {
        Err(ProbeError::Failed("port scan denied".to_string()))
    })
}

/// Custom policy: only rooting blocks
struct BlockOnRoot;

impl BlockPolicy for BlockOnRoot {
    fn name(&self) -> &str {
        "block_on_root"
    }

    fn should_block(&self, verdict: &Verdict) -> bool {
        verdict.is_rooted()
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_all_clear_is_safe() {
    let evaluator = TrustEvaluator::new(ProbeSet::default());
    let verdict = evaluator.evaluate(&PlatformContext::default());

    assert_eq!(verdict.mask(), 0);
    assert_eq!(verdict.band(), SeverityBand::Safe);
    assert_eq!(verdict.summary(), NO_THREATS_MESSAGE);
    assert!(!verdict.should_block());
    assert!(verdict.error().is_none());
    assert_eq!(verdict.policy(), "default");
}

#[test]
fn test_root_and_instrumentation_is_danger() {
    let evaluator = TrustEvaluator::new(ProbeSet::fixed([
        ThreatSignal::Root,
        ThreatSignal::Instrumentation,
    ]));
    let verdict = evaluator.evaluate(&PlatformContext::default());

    assert_eq!(verdict.mask(), 0x05);
    assert_eq!(verdict.band(), SeverityBand::Danger);
    assert!(verdict.is_rooted());
    assert!(verdict.is_instrumented());
    assert!(!verdict.is_debugger_attached());
    assert!(!verdict.is_tampered());
    assert!(verdict.summary().contains(ThreatSignal::Root.label()));
    assert!(verdict.summary().contains(ThreatSignal::Instrumentation.label()));
    assert!(verdict.should_block());
}

#[test]
fn test_every_combination_matches_ladder() {
    for bits in 0..16u8 {
        let detected: Vec<ThreatSignal> = ThreatSignal::ALL
            .into_iter()
            .filter(|s| bits & s.bit() != 0)
            .collect();
        let verdict = TrustEvaluator::new(ProbeSet::fixed(detected))
            .evaluate(&PlatformContext::default());

        assert_eq!(verdict.mask(), i32::from(bits));
        assert_eq!(verdict.band(), SeverityBand::from_mask(i32::from(bits)));
    }
}

#[test]
fn test_added_probe_never_lowers_band() {
    let ctx = PlatformContext::default();
    for bits in 0..16u8 {
        let base: Vec<ThreatSignal> = ThreatSignal::ALL
            .into_iter()
            .filter(|s| bits & s.bit() != 0)
            .collect();
        let before = TrustEvaluator::new(ProbeSet::fixed(base.clone())).evaluate(&ctx);

        for extra in ThreatSignal::ALL {
            let mut more = base.clone();
            more.push(extra);
            let after = TrustEvaluator::new(ProbeSet::fixed(more)).evaluate(&ctx);
            assert!(after.band().is_at_least(before.band()));
        }
    }
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_probe_failure_is_error_verdict() {
    let probes = ProbeSet::fixed([ThreatSignal::Root])
        .with_probe(ThreatSignal::Instrumentation, failing_probe());
    let verdict = TrustEvaluator::new(probes).evaluate(&PlatformContext::default());

    assert_eq!(verdict.band(), SeverityBand::Error);
    assert_ne!(verdict.band(), SeverityBand::Safe);
    assert_eq!(verdict.mask(), -1);
    let message = verdict.error().unwrap();
    assert!(message.contains("frida_scan"));
    assert!(message.contains("port scan denied"));
    assert_eq!(verdict.summary(), message);
    // No partial mask leaks through
    assert!(!verdict.is_rooted());
    // Default policy fails closed
    assert!(verdict.should_block());
}

#[test]
fn test_error_decision_follows_policy() {
    let probes = ProbeSet::default().with_probe(ThreatSignal::Debug, failing_probe());
    let verdict = TrustEvaluator::new(probes)
        .with_policy(PolicyConfig::permissive())
        .evaluate(&PlatformContext::default());

    assert_eq!(verdict.band(), SeverityBand::Error);
    assert!(!verdict.should_block());
    assert_eq!(verdict.policy(), "permissive");
}

#[test]
fn test_missing_signature_context_is_error() {
    let probes = ProbeSet::default().with_probe(ThreatSignal::Integrity, SignatureDigestProbe);
    let evaluator = TrustEvaluator::new(probes);

    let verdict = evaluator.evaluate(&PlatformContext::new("vn.example.app"));
    assert_eq!(verdict.band(), SeverityBand::Error);
    assert!(verdict.summary().contains("signature digest missing"));

    let tampered = PlatformContext::new("vn.example.app").with_signatures("00ff", "ff00");
    let verdict = evaluator.evaluate(&tampered);
    assert_eq!(verdict.mask(), 0x08);
    assert_eq!(verdict.band(), SeverityBand::Critical);
    assert!(verdict.is_tampered());
}

#[test]
fn test_panicking_probe_is_error_verdict() {
    let probes = ProbeSet::fixed([ThreatSignal::Debug]).with_probe(
        ThreatSignal::Root,
        FnProbe::new("su_binary", |_ctx: &PlatformContext| -> Result<bool, ProbeError> {
            panic!("mount table unreadable")
        }),
    );
    let verdict = TrustEvaluator::new(probes).evaluate(&PlatformContext::default());

    assert_eq!(verdict.band(), SeverityBand::Error);
    assert_eq!(verdict.mask(), -1);
    assert!(verdict.is_error());
    let message = verdict.error().unwrap();
    assert!(message.contains("su_binary"));
    assert!(message.contains("mount table unreadable"));
    assert!(!verdict.is_debugger_attached());
    assert!(verdict.should_block());
}

// ============================================================================
// POLICY & LIFECYCLE
// ============================================================================

#[test]
fn test_custom_policy_is_pluggable() {
    let evaluator = TrustEvaluator::new(ProbeSet::fixed([ThreatSignal::Integrity]))
        .with_policy(BlockOnRoot);
    assert_eq!(evaluator.policy_name(), "block_on_root");

    let verdict = evaluator.evaluate(&PlatformContext::default());
    assert_eq!(verdict.band(), SeverityBand::Critical);
    assert!(!verdict.should_block());
    assert_eq!(verdict.policy(), "block_on_root");

    let rooted = evaluate_with(
        &ProbeSet::fixed([ThreatSignal::Root]),
        &BlockOnRoot,
        &PlatformContext::default(),
    );
    assert!(rooted.should_block());
}

#[test]
fn test_verdicts_are_not_cached() {
    let debugger = Arc::new(AtomicBool::new(false));
    let probe_state = Arc::clone(&debugger);
    let probes = ProbeSet::default().with_probe(
        ThreatSignal::Debug,
        FnProbe::new("tracer_pid", move |_ctx: &PlatformContext| {
            Ok(probe_state.load(Ordering::SeqCst))
        }),
    );
    let evaluator = TrustEvaluator::new(probes);
    let ctx = PlatformContext::default();

    assert_eq!(evaluator.evaluate(&ctx).band(), SeverityBand::Safe);
    debugger.store(true, Ordering::SeqCst);
    let verdict = evaluator.evaluate(&ctx);
    assert_eq!(verdict.band(), SeverityBand::Warning);
    assert!(verdict.is_debugger_attached());
}

#[test]
fn test_concurrent_evaluation() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TrustEvaluator>();

    let evaluator = Arc::new(
        TrustEvaluator::new(ProbeSet::new(
            StaticProbe::detected("su_binary"),
            StaticProbe::clear("tracer_pid"),
            StaticProbe::clear("frida_scan"),
            StaticProbe::clear("apk_signature"),
        ))
        .with_policy(PolicyConfig::strict()),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let evaluator = Arc::clone(&evaluator);
            thread::spawn(move || evaluator.evaluate(&PlatformContext::default()))
        })
        .collect();

    for handle in handles {
        let verdict = handle.join().unwrap();
        assert_eq!(verdict.mask(), 0x01);
        assert_eq!(verdict.band(), SeverityBand::Warning);
        assert!(verdict.should_block());
    }
}
