//! Byte/text transforms shared by both token tracks.

use std::io::Read;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::CodecError;

/// Characters left bare in a URL component, as `encodeURIComponent` does.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode bytes in the URL-safe base64 alphabet without padding.
pub(crate) fn to_url_safe(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Encode bytes in the standard base64 alphabet.
pub(crate) fn to_standard(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 in either alphabet, padded or not, possibly still
/// percent-encoded.
///
/// Query-string decoding may have turned `+` into a space, so spaces are
/// read back as `+`.
pub(crate) fn from_base64(token: &str) -> Result<Vec<u8>, CodecError> {
    let text = percent_decode(token)?;
    let normalized: String = text
        .chars()
        .filter(|c| !matches!(c, '=' | '\r' | '\n'))
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    Ok(URL_SAFE_NO_PAD.decode(normalized)?)
}

/// Percent-encode text for use as a URL component.
pub(crate) fn percent_encode(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

/// Undo percent-encoding.
pub(crate) fn percent_decode(text: &str) -> Result<String, CodecError> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| CodecError::PercentEncoding)
}

pub(crate) fn compress(bytes: &[u8], level: i32) -> Result<Vec<u8>, CodecError> {
    Ok(zstd::encode_all(bytes, level)?)
}

/// Decompress, refusing output larger than `limit` bytes.
pub(crate) fn decompress(bytes: &[u8], limit: usize) -> Result<Vec<u8>, CodecError> {
    let decoder = zstd::stream::read::Decoder::new(bytes)?;
    let mut out = Vec::new();
    decoder.take(limit as u64 + 1).read_to_end(&mut out)?;
    if out.len() > limit {
        return Err(CodecError::TooLarge { limit });
    }
    Ok(out)
}
