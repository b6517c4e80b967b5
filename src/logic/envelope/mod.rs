//! Envelope Module
//!
//! Seals application records into opaque tokens and opens them again.
//!
//! ## Structure
//! - `types`: Record / Value (closed value model, JSON mapping)
//! - `key`: KeyMaterial (injected AES-256 key, fingerprint)
//! - `codec`: EnvelopeCodec (seal / open)
//! - `error`: EnvelopeError taxonomy
//!
//! ## Usage
//! ```ignore
//! use secure_fabric::logic::envelope::{EnvelopeCodec, KeyMaterial, Record};
//!
//! let codec = EnvelopeCodec::new(KeyMaterial::from_base64(&configured_key));
//! assert!(codec.key_is_valid());
//!
//! let token = codec.seal(&Record::new().with("userId", "abc123"))?;
//! let record = codec.open(&token)?;
//! ```

pub mod codec;
pub mod error;
pub mod key;
pub mod types;


pub use codec::{EnvelopeCodec, BLOCK_SIZE};
pub use error::{EnvelopeError, EnvelopeResult};
pub use key::{KeyMaterial, KEY_LEN};
pub use types::{Record, Value};
