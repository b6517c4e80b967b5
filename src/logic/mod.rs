//! Logic Module - Security Fabric Engines
//!
//! Two independent leaf components, composed only by the caller.
//!
//! - `envelope/` - Record sealing (canonical JSON, AES-256-ECB, Base64)
//! - `trust/` - Device trust evaluation (probes, severity band, block policy)

pub mod envelope;
pub mod trust;
