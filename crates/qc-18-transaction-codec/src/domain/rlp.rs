//! # Byte-Sequence Codec (RLP)
//!
//! Minimal big-endian, length-prefixed framing used by every envelope.
//!
//! ## Encoding Rules
//!
//! | Payload | Header |
//! |---------|--------|
//! | single byte `< 0x80` | none, the byte is its own encoding |
//! | string, `len < 56` | `0x80 + len` |
//! | string, `len >= 56` | `0xb7 + len(len)` then `len` big-endian |
//! | list payload, `len < 56` | `0xc0 + len` |
//! | list payload, `len >= 56` | `0xf7 + len(len)` then `len` big-endian |
//!
//! ## Canonical Decoding
//!
//! The decoder accepts exactly one encoding per value. Integers with leading
//! zero bytes, single bytes wrapped in a `0x81` header, long-form headers for
//! short payloads, and list children that overrun their parent are rejected.

use primitive_types::U256;
use thiserror::Error;

/// Offset of short string headers.
const STRING_OFFSET: u8 = 0x80;
/// Offset of short list headers.
const LIST_OFFSET: u8 = 0xc0;
/// Payloads at or above this length use the long form header.
const LONG_THRESHOLD: usize = 56;

/// Framing and canonicality violations.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RlpError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("{0} trailing bytes after top-level item")]
    TrailingBytes(usize),

    #[error("non-canonical size prefix")]
    NonCanonicalSize,

    #[error("integer has leading zero bytes")]
    LeadingZero,

    #[error("value exceeds {0} bytes")]
    Overflow(usize),

    #[error("expected list, found string")]
    ExpectedList,

    #[error("expected string, found list")]
    ExpectedString,

    #[error("list children do not match declared list length")]
    ListLengthMismatch,

    #[error("expected {expected} bytes, found {actual}")]
    UnexpectedLength { expected: usize, actual: usize },
}

// =============================================================================
// ENCODING
// =============================================================================

/// RLP-encode a byte slice.
pub fn encode_bytes(out: &mut Vec<u8>, data: &[u8]) {
    if data.len() == 1 && data[0] < STRING_OFFSET {
        out.push(data[0]);
    } else {
        encode_header(out, data.len(), STRING_OFFSET);
        out.extend_from_slice(data);
    }
}

/// RLP-encode a u64 value as a minimal big-endian integer.
pub fn encode_u64(out: &mut Vec<u8>, value: u64) {
    let bytes = value.to_be_bytes();
    encode_bytes(out, trim_leading_zeros(&bytes));
}

/// RLP-encode a U256 value as a minimal big-endian integer.
pub fn encode_u256(out: &mut Vec<u8>, value: &U256) {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    encode_bytes(out, trim_leading_zeros(&bytes));
}

/// RLP-encode a 32-byte big-endian word (signature scalar) as an integer.
pub fn encode_word(out: &mut Vec<u8>, word: &[u8; 32]) {
    encode_bytes(out, trim_leading_zeros(word));
}

/// Wrap already-encoded items in a list header.
pub fn encode_list(out: &mut Vec<u8>, payload: &[u8]) {
    encode_header(out, payload.len(), LIST_OFFSET);
    out.extend_from_slice(payload);
}

fn encode_header(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len < LONG_THRESHOLD {
        out.push(offset + len as u8);
    } else {
        let len_bytes = len.to_be_bytes();
        let len_bytes = trim_leading_zeros(&len_bytes);
        // Long form sits 55 above the short form offset (0xb7 / 0xf7).
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

// =============================================================================
// DECODING
// =============================================================================

/// A decoded RLP item borrowing its payload from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    /// Byte string payload.
    String(&'a [u8]),
    /// Concatenated encodings of the list's children.
    List(&'a [u8]),
}

struct Header {
    list: bool,
    payload_len: usize,
}

/// Decode exactly one item spanning the whole input.
pub fn decode_exact(input: &[u8]) -> Result<Item<'_>, RlpError> {
    let mut rest = input;
    let item = decode_item(&mut rest)?;
    if !rest.is_empty() {
        return Err(RlpError::TrailingBytes(rest.len()));
    }
    Ok(item)
}

/// Decode exactly one list spanning the whole input and return its children.
pub fn decode_list(input: &[u8]) -> Result<Vec<Item<'_>>, RlpError> {
    decode_exact(input)?.as_list()
}

/// Decode the item at the front of `input`, advancing it past the item.
pub fn decode_item<'a>(input: &mut &'a [u8]) -> Result<Item<'a>, RlpError> {
    let (header, header_len) = decode_header(input)?;
    let end = header_len
        .checked_add(header.payload_len)
        .ok_or(RlpError::Overflow(std::mem::size_of::<usize>()))?;
    if end > input.len() {
        return Err(RlpError::UnexpectedEnd);
    }

    let payload = &input[header_len..end];
    *input = &input[end..];

    Ok(if header.list {
        Item::List(payload)
    } else {
        Item::String(payload)
    })
}

/// Parse a header, returning it with the number of header bytes consumed.
fn decode_header(input: &[u8]) -> Result<(Header, usize), RlpError> {
    let first = *input.first().ok_or(RlpError::UnexpectedEnd)?;

    match first {
        // The byte is its own payload.
        0x00..=0x7f => Ok((
            Header {
                list: false,
                payload_len: 1,
            },
            0,
        )),
        0x80..=0xb7 => {
            let payload_len = (first - STRING_OFFSET) as usize;
            if payload_len == 1 {
                let byte = *input.get(1).ok_or(RlpError::UnexpectedEnd)?;
                if byte < STRING_OFFSET {
                    return Err(RlpError::NonCanonicalSize);
                }
            }
            Ok((
                Header {
                    list: false,
                    payload_len,
                },
                1,
            ))
        }
        0xb8..=0xbf => {
            let (payload_len, header_len) = decode_long_length(input, (first - 0xb7) as usize)?;
            Ok((
                Header {
                    list: false,
                    payload_len,
                },
                header_len,
            ))
        }
        0xc0..=0xf7 => Ok((
            Header {
                list: true,
                payload_len: (first - LIST_OFFSET) as usize,
            },
            1,
        )),
        0xf8..=0xff => {
            let (payload_len, header_len) = decode_long_length(input, (first - 0xf7) as usize)?;
            Ok((
                Header {
                    list: true,
                    payload_len,
                },
                header_len,
            ))
        }
    }
}

fn decode_long_length(input: &[u8], len_of_len: usize) -> Result<(usize, usize), RlpError> {
    let len_bytes = input
        .get(1..1 + len_of_len)
        .ok_or(RlpError::UnexpectedEnd)?;

    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonicalSize);
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(RlpError::Overflow(std::mem::size_of::<usize>()));
    }

    let len = len_bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len < LONG_THRESHOLD {
        return Err(RlpError::NonCanonicalSize);
    }

    Ok((len, 1 + len_of_len))
}

impl<'a> Item<'a> {
    /// Whether this item is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Item::List(_))
    }

    /// Raw byte-string payload.
    pub fn as_bytes(&self) -> Result<&'a [u8], RlpError> {
        match *self {
            Item::String(bytes) => Ok(bytes),
            Item::List(_) => Err(RlpError::ExpectedString),
        }
    }

    /// Decode the children of a list item.
    pub fn as_list(&self) -> Result<Vec<Item<'a>>, RlpError> {
        let Item::List(mut payload) = *self else {
            return Err(RlpError::ExpectedList);
        };

        let mut items = Vec::new();
        while !payload.is_empty() {
            let item = decode_item(&mut payload).map_err(|e| match e {
                RlpError::UnexpectedEnd => RlpError::ListLengthMismatch,
                other => other,
            })?;
            items.push(item);
        }
        Ok(items)
    }

    /// Canonical unsigned integer that fits in a u64.
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = self.as_canonical_uint(8)?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Canonical unsigned integer that fits in a U256.
    pub fn as_u256(&self) -> Result<U256, RlpError> {
        let bytes = self.as_canonical_uint(32)?;
        Ok(U256::from_big_endian(bytes))
    }

    /// Canonical unsigned integer left-padded into a 32-byte word.
    pub fn as_word(&self) -> Result<[u8; 32], RlpError> {
        let bytes = self.as_canonical_uint(32)?;
        let mut word = [0u8; 32];
        word[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(word)
    }

    /// Byte string of exactly `N` bytes.
    pub fn as_fixed<const N: usize>(&self) -> Result<[u8; N], RlpError> {
        let bytes = self.as_bytes()?;
        <[u8; N]>::try_from(bytes).map_err(|_| RlpError::UnexpectedLength {
            expected: N,
            actual: bytes.len(),
        })
    }

    fn as_canonical_uint(&self, max_len: usize) -> Result<&'a [u8], RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.len() > max_len {
            return Err(RlpError::Overflow(max_len));
        }
        if bytes.first() == Some(&0) {
            return Err(RlpError::LeadingZero);
        }
        Ok(bytes)
    }
}
