//! Envelope Codec
//!
//! Record -> canonical JSON -> AES-256-ECB (PKCS#7) -> Base64, and back.
//!
//! ECB with no nonce is deterministic: equal records under one key give
//! equal tokens, and equal 16-byte plaintext blocks give equal ciphertext
//! blocks. There is no authentication tag; tampering is only caught when
//! it breaks the padding or the JSON.

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ecb::cipher::typenum::Unsigned;
use ecb::cipher::{
    block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, BlockSizeUser, KeyInit,
};

use super::error::{EnvelopeError, EnvelopeResult};
use super::key::{KeyMaterial, KEY_LEN};
use super::types::Record;

type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

/// AES block size in bytes, taken from the cipher itself
pub const BLOCK_SIZE: usize = <<Aes256 as BlockSizeUser>::BlockSize as Unsigned>::USIZE;

/// Seals and opens records under one fixed key
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    key: KeyMaterial,
}

impl EnvelopeCodec {
    pub fn new(key: KeyMaterial) -> Self {
        Self { key }
    }

    /// Build from Base64 configuration text
    pub fn from_base64_key(encoded: &str) -> Self {
        Self::new(KeyMaterial::from_base64(encoded))
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Startup check: key decodes to exactly 256 bits
    pub fn key_is_valid(&self) -> bool {
        self.key.is_valid()
    }

    /// Seal a record into a transportable token
    pub fn seal(&self, record: &Record) -> EnvelopeResult<String> {
        let plaintext = encode_record(record)?;
        let ciphertext = self.encrypt(&plaintext)?;
        let token = BASE64.encode(&ciphertext);

        log::debug!(
            "Sealed record: {} fields, {} plaintext bytes, {} token chars",
            record.len(),
            plaintext.len(),
            token.len()
        );

        Ok(token)
    }

    /// Open a token produced by [`seal`](Self::seal) under the same key
    pub fn open(&self, token: &str) -> EnvelopeResult<Record> {
        let ciphertext = BASE64
            .decode(token.as_bytes())
            .map_err(|e| EnvelopeError::DecodingFailure(e.to_string()))?;
        let plaintext = self.decrypt(&ciphertext)?;
        let record = decode_record(&plaintext)?;

        log::debug!("Opened token: {} fields", record.len());

        Ok(record)
    }

    pub(super) fn encrypt(&self, plaintext: &[u8]) -> EnvelopeResult<Vec<u8>> {
        let cipher = Aes256EcbEnc::new_from_slice(self.key.bytes()?)
            .map_err(|_| self.key_length_error())?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    pub(super) fn decrypt(&self, ciphertext: &[u8]) -> EnvelopeResult<Vec<u8>> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(EnvelopeError::CipherFailure(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            )));
        }

        let cipher = Aes256EcbDec::new_from_slice(self.key.bytes()?)
            .map_err(|_| self.key_length_error())?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| {
                EnvelopeError::CipherFailure(
                    "invalid padding (wrong key or corrupted ciphertext)".to_string(),
                )
            })
    }

    fn key_length_error(&self) -> EnvelopeError {
        EnvelopeError::CipherFailure(format!(
            "invalid key length: expected {} bytes, got {}",
            KEY_LEN,
            self.key.len().unwrap_or(0)
        ))
    }
}

fn encode_record(record: &Record) -> EnvelopeResult<Vec<u8>> {
    let json = record.to_json_value()?;
    serde_json::to_vec(&json).map_err(|e| EnvelopeError::EncodingFailure(e.to_string()))
}

fn decode_record(bytes: &[u8]) -> EnvelopeResult<Record> {
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| EnvelopeError::ParseFailure(e.to_string()))?;
    Record::from_json_value(json)
}
