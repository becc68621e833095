//! Codec error types.

use thiserror::Error;

/// Errors from encoding or decoding transit tokens.
///
/// Public decoders fold these into `None`/`false`; the `try_*` variants
/// return them for diagnostics.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Token is not valid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Token is not valid percent-encoded UTF-8.
    #[error("invalid percent encoding")]
    PercentEncoding,

    /// Decoded bytes are not UTF-8 text.
    #[error("payload is not UTF-8 text")]
    NotText,

    /// Payload JSON could not be (de)serialized.
    #[error("payload json: {0}")]
    Json(#[from] serde_json::Error),

    /// Compression or decompression failed.
    #[error("compression: {0}")]
    Compression(#[from] std::io::Error),

    /// Decompressed payload exceeds the size limit.
    #[error("payload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// Decryption failed (wrong key, truncated or tampered token).
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// Envelope lacks a required field.
    #[error("envelope missing field: {0}")]
    MissingField(&'static str),

    /// Envelope carries a different payload type than expected.
    #[error("expected {expected} payload, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// Envelope is older than the allowed age.
    #[error("envelope expired: {age_ms}ms old, limit {max_age_ms}ms")]
    Expired { age_ms: i64, max_age_ms: i64 },
}
