//! Envelope Errors
//!
//! Typed failures for seal/open. Never swallowed: a mis-keyed or corrupted
//! token must not be read back as empty data.

use thiserror::Error;

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Codec failure taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Record holds a value the structural encoding cannot carry
    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    /// Key material, ciphertext length or padding problem (either direction)
    #[error("Cipher failure: {0}")]
    CipherFailure(String),

    /// Token is not valid Base64
    #[error("Decoding failure: {0}")]
    DecodingFailure(String),

    /// Decrypted bytes are not a valid JSON record
    #[error("Parse failure: {0}")]
    ParseFailure(String),
}

impl EnvelopeError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EncodingFailure(_) => "encoding",
            Self::CipherFailure(_) => "cipher",
            Self::DecodingFailure(_) => "decoding",
            Self::ParseFailure(_) => "parse",
        }
    }
}
