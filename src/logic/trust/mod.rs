//! Trust Module
//!
//! Aggregates independent device threat probes into one verdict.
//! Probes sense; this module only combines, classifies and decides.
//!
//! ## Structure
//! - `types`: ThreatSignal, ThreatFlags, SeverityBand, Verdict
//! - `context`: PlatformContext handed to probes
//! - `rules`: Bits, band thresholds, summary text
//! - `probes`: ThreatProbe trait, stock probes, ProbeSet
//! - `policy`: BlockPolicy trait and PolicyConfig presets
//! - `evaluator`: Aggregation logic
//!
//! ## Usage
//! ```ignore
//! use secure_fabric::logic::trust::{PlatformContext, PolicyConfig, ProbeSet, TrustEvaluator};
//!
//! let evaluator = TrustEvaluator::new(probes).with_policy(PolicyConfig::strict());
//! let verdict = evaluator.evaluate(&PlatformContext::new("vn.example.app"));
//! if verdict.should_block() {
//!     show_blocked_screen(verdict.summary());
//! }
//! ```

pub mod context;
pub mod evaluator;
pub mod policy;
pub mod probes;
pub mod rules;
pub mod types;

#[cfg(test)]
mod tests;

pub use context::PlatformContext;

pub use evaluator::{evaluate_with, TrustEvaluator};

pub use policy::{BlockPolicy, PolicyConfig};

pub use probes::{
    AttributeProbe, FnProbe, ProbeError, ProbeSet, SignatureDigestProbe, StaticProbe, ThreatProbe,
};

pub use rules::{ERROR_SENTINEL, NO_THREATS_MESSAGE};

pub use types::{SeverityBand, ThreatFlags, ThreatSignal, Verdict};
