//! Sealed tokens: compressed, then AES-256-CBC under a static passphrase.
//!
//! Not authenticated and not secret. The passphrase ships with every client,
//! so a sealed token only stops casual edits to prices in the address bar.

use std::fmt;

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::CodecConfig;
use crate::transform;
use crate::CodecError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Upper bound on decompressed payload size.
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Seals and opens tokens under one passphrase.
#[derive(Clone)]
pub struct SealedCodec {
    key: [u8; 32],
    level: i32,
}

impl SealedCodec {
    /// Derive the cipher key as SHA-256 of `secret`.
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self {
            key,
            level: CodecConfig::default().compression_level,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(&config.secret).with_level(config.compression_level)
    }

    /// Set the zstd compression level.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// JSON, compress, encrypt with a fresh IV, then base64 and
    /// percent-encode.
    pub fn seal<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, CodecError> {
        let json = serde_json::to_vec(payload)?;
        let packed = transform::compress(&json, self.level)?;

        let iv: [u8; IV_LEN] = rand::random();
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(&packed);

        let mut sealed = Vec::with_capacity(IV_LEN + ciphertext.len());
        sealed.extend_from_slice(&iv);
        sealed.extend_from_slice(&ciphertext);

        debug!(json_bytes = json.len(), sealed_bytes = sealed.len(), "sealed payload");
        Ok(transform::percent_encode(&transform::to_standard(&sealed)))
    }

    pub fn try_open<T: DeserializeOwned>(&self, token: &str) -> Result<T, CodecError> {
        let sealed = transform::from_base64(token)?;
        if sealed.len() < IV_LEN + BLOCK_LEN || (sealed.len() - IV_LEN) % BLOCK_LEN != 0 {
            return Err(CodecError::Decrypt(format!(
                "sealed length {} is not an IV plus whole blocks",
                sealed.len()
            )));
        }

        let (iv, ciphertext) = sealed.split_at(IV_LEN);
        let mut iv_block = [0u8; IV_LEN];
        iv_block.copy_from_slice(iv);

        let packed = Aes256CbcDec::new(&self.key.into(), &iv_block.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CodecError::Decrypt("bad padding".to_string()))?;
        let json = transform::decompress(&packed, MAX_PAYLOAD_BYTES)?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Reverse [`SealedCodec::seal`]. Wrong key, truncation or tampering
    /// yields `None`.
    pub fn open<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        self.try_open(token)
            .map_err(|e| debug!(error = %e, "rejecting sealed token"))
            .ok()
    }

    /// Compress-only variant for links whose contents are harmless to edit.
    pub fn compress<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, CodecError> {
        let json = serde_json::to_vec(payload)?;
        let packed = transform::compress(&json, self.level)?;
        Ok(transform::to_url_safe(&packed))
    }

    pub fn try_decompress<T: DeserializeOwned>(&self, token: &str) -> Result<T, CodecError> {
        let packed = transform::from_base64(token)?;
        let json = transform::decompress(&packed, MAX_PAYLOAD_BYTES)?;
        Ok(serde_json::from_slice(&json)?)
    }

    pub fn decompress<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        self.try_decompress(token)
            .map_err(|e| debug!(error = %e, "rejecting compressed token"))
            .ok()
    }
}

impl Default for SealedCodec {
    fn default() -> Self {
        Self::from_config(&CodecConfig::default())
    }
}

impl fmt::Debug for SealedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedCodec")
            .field("key", &"..")
            .field("level", &self.level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn buy_now() -> Value {
        json!({
            "productId": "P-9",
            "productName": {"en": "Oud", "ar": "عود"},
            "quantity": 1,
            "price": 120.5,
            "discount": 20
        })
    }

    #[test]
    fn test_seal_open() {
        let codec = SealedCodec::default();
        let token = codec.seal(&buy_now()).unwrap();
        assert_eq!(codec.open::<Value>(&token), Some(buy_now()));
    }

    #[test]
    fn test_seal_uses_fresh_iv() {
        let codec = SealedCodec::new("k");
        let a = codec.seal(&buy_now()).unwrap();
        let b = codec.seal(&buy_now()).unwrap();
        assert_ne!(a, b);
        assert_eq!(codec.open::<Value>(&a), codec.open::<Value>(&b));
    }

    #[test]
    fn test_seal_token_is_url_component_safe() {
        let token = SealedCodec::default().seal(&buy_now()).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "%-_.!~*'()".contains(c)));
    }

    #[test]
    fn test_open_with_wrong_key_is_none() {
        let token = SealedCodec::new("right").seal(&buy_now()).unwrap();
        assert_eq!(SealedCodec::new("wrong").open::<Value>(&token), None);
    }

    #[test]
    fn test_open_truncated_is_none() {
        let codec = SealedCodec::default();
        let token = codec.seal(&buy_now()).unwrap();
        for cut in [0, 1, 10, token.len() / 2, token.len() - 1] {
            assert_eq!(codec.open::<Value>(&token[..cut]), None, "cut at {cut}");
        }
    }

    #[test]
    fn test_open_garbage_is_none() {
        let codec = SealedCodec::default();
        assert_eq!(codec.open::<Value>("not a token"), None);
        assert_eq!(codec.open::<Value>(&"A".repeat(64)), None);
    }

    #[test]
    fn test_compress_round_trip() {
        let codec = SealedCodec::default();
        let payload = json!({"packageId": "K", "items": [{"productId": "P", "quantity": 2}]});
        let token = codec.compress(&payload).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(codec.decompress::<Value>(&token), Some(payload));
        assert_eq!(codec.decompress::<Value>("@@@"), None);
    }

    #[test]
    fn test_decompress_rejects_oversized_payload() {
        let codec = SealedCodec::default();
        let huge = "x".repeat(MAX_PAYLOAD_BYTES + 10);
        let token = codec.compress(&huge).unwrap();
        assert!(matches!(
            codec.try_decompress::<String>(&token),
            Err(CodecError::TooLarge { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_seal_round_trip(
            names in proptest::collection::vec("[\u{0600}-\u{06FF}a-z ]{0,12}", 0..8),
            quantities in proptest::collection::vec(any::<i64>(), 0..8),
        ) {
            let codec = SealedCodec::new("prop");
            let payload = json!({"names": names, "quantities": quantities});
            let token = codec.seal(&payload).unwrap();
            prop_assert_eq!(codec.open::<Value>(&token), Some(payload));
        }
    }
}
