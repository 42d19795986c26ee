//! Hex string handling at the codec boundary.
//!
//! Callers may pass `0x`-prefixed or bare hex; both normalize to the
//! prefixed form.

use super::errors::{CodecError, CodecResult};

/// Trim whitespace and drop a `0x`/`0X` prefix if present.
pub fn strip_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Normalize to a `0x`-prefixed string.
pub fn normalize(raw: &str) -> String {
    format!("0x{}", strip_prefix(raw))
}

/// Decode envelope hex into bytes.
pub fn decode(raw: &str) -> CodecResult<Vec<u8>> {
    hex::decode(strip_prefix(raw))
        .map_err(|e| CodecError::MalformedEncoding(format!("invalid hex: {}", e)))
}

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
