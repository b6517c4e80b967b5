//! Central Configuration Constants
//!
//! Single source of truth for defaults and environment variable names.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "secure-fabric";

// ============================================
// Environment variables
// ============================================

/// Base64 envelope key (32 bytes decoded)
pub const ENV_ENVELOPE_KEY: &str = "SECURE_FABRIC_ENVELOPE_KEY";

/// File holding the Base64 envelope key
pub const ENV_KEY_FILE: &str = "SECURE_FABRIC_KEY_FILE";

/// Block policy preset name
pub const ENV_BLOCK_POLICY: &str = "SECURE_FABRIC_BLOCK_POLICY";

// ============================================
// Defaults
// ============================================

/// Default block policy preset
pub const DEFAULT_BLOCK_POLICY: &str = "default";

/// Default log filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
