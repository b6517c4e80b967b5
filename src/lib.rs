//! Secure Fabric
//!
//! Application security fabric with two independent components:
//!
//! - **Envelope codec** ([`EnvelopeCodec`]) - seals a [`Record`] into an
//!   opaque Base64 token under a pre-shared AES-256 key and opens it again.
//! - **Trust evaluator** ([`TrustEvaluator`]) - runs root / debugger /
//!   instrumentation / integrity probes and renders a classified
//!   [`Verdict`] with a block decision.
//!
//! ```ignore
//! let codec = Config::from_env().envelope_codec()?;
//! let token = codec.seal(&Record::new().with("userId", "abc123"))?;
//!
//! let verdict = TrustEvaluator::new(probes).evaluate(&PlatformContext::default());
//! ```

pub mod config;
pub mod constants;
pub mod logic;

pub use config::{Config, ConfigError};

pub use logic::envelope::{EnvelopeCodec, EnvelopeError, EnvelopeResult, KeyMaterial, Record, Value};

pub use logic::trust::{
    BlockPolicy, PlatformContext, PolicyConfig, ProbeError, ProbeSet, SeverityBand, ThreatFlags,
    ThreatProbe, ThreatSignal, TrustEvaluator, Verdict,
};
