//! Trust Classification Rules
//!
//! Bit assignments, band thresholds and summary text.
//! KHÔNG chứa logic classify - chỉ constants.

// ============================================================================
// SIGNAL BITS
// ============================================================================

pub const ROOT_BIT: u8 = 0x01;
pub const DEBUG_BIT: u8 = 0x02;
pub const INSTRUMENTATION_BIT: u8 = 0x04;
pub const INTEGRITY_BIT: u8 = 0x08;

/// Union of every known signal bit
pub const ALL_BITS: u8 = ROOT_BIT | DEBUG_BIT | INSTRUMENTATION_BIT | INTEGRITY_BIT;

// ============================================================================
// BAND LADDER (mask thresholds)
// ============================================================================

/// Mask reported when evaluation itself could not complete
pub const ERROR_SENTINEL: i32 = -1;

/// Lowest mask classified as Warning
pub const WARNING_MIN: i32 = 1;

/// Lowest mask classified as Danger
pub const DANGER_MIN: i32 = 4;

/// Lowest mask classified as Critical
pub const CRITICAL_MIN: i32 = 8;

// ============================================================================
// SUMMARY
// ============================================================================

pub const NO_THREATS_MESSAGE: &str = "No threats detected";

pub const SUMMARY_SEPARATOR: &str = ", ";
