//! # Inbound Ports (Driving Ports / API)
//!
//! The three boundaries a presentation layer (CLI, RPC handler, UI) drives:
//! decode, generate and sign. Hex crosses the boundary either `0x`-prefixed
//! or bare.

use crate::domain::entities::{DecodedReport, SignedEnvelope, UnsignedEnvelope};
use crate::domain::errors::CodecResult;
use crate::domain::validation::FieldMap;

/// Primary Transaction Codec API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait TransactionCodecApi: Send + Sync {
    /// Decode an envelope of any supported type.
    ///
    /// For signed envelopes the report also carries the final hash and the
    /// recovered sender.
    fn decode_hex(&self, raw: &str) -> CodecResult<DecodedReport>;

    /// Build an unsigned envelope from loose fields, applying generation
    /// defaults for anything omitted.
    fn generate_unsigned(&self, fields: &FieldMap) -> CodecResult<UnsignedEnvelope>;

    /// Sign an envelope with a hex private key.
    ///
    /// # Security
    /// - The key is parsed and zeroized within the call; it is never logged
    /// - An existing signature on the input is replaced
    fn sign_hex(&self, unsigned_hex: &str, private_key_hex: &str) -> CodecResult<SignedEnvelope>;
}
