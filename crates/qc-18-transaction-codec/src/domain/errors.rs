//! # Codec Errors
//!
//! Error taxonomy for envelope decoding, field validation and signing.
//!
//! Every operation in this crate is a pure computation, so errors are
//! returned to the caller immediately and never retried or defaulted.

use thiserror::Error;

use super::config::ConfigError;
use super::rlp::RlpError;

/// Top-level error for every codec and signing operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Framing, length or canonicality violation while decoding.
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Missing, unknown, or type-inapplicable field.
    #[error("Field error on `{field}`: {reason}")]
    FieldError { field: String, reason: String },

    /// Type discriminator outside {0, 1, 2}.
    #[error("Invalid transaction type: {0}")]
    InvalidType(u64),

    /// Private key is not a valid secp256k1 scalar.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Malformed `r, s, v` or a `v` that does not decode for the transaction type.
    #[error("Signature error: {0}")]
    SignatureError(#[from] SignatureError),

    /// Codec configuration rejected by `CodecConfig::validate`.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CodecError {
    /// Shorthand for a [`CodecError::FieldError`].
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<RlpError> for CodecError {
    fn from(e: RlpError) -> Self {
        Self::MalformedEncoding(e.to_string())
    }
}

/// Errors raised while producing or checking ECDSA signatures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// r or s is zero or not below the curve order
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// v does not map to a recovery id for this transaction type
    #[error("Invalid recovery ID for v = {0}")]
    InvalidRecoveryId(u64),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// The signing primitive itself failed
    #[error("Signing failed")]
    SigningFailed,
}

/// Convenience alias used across the crate.
pub type CodecResult<T> = Result<T, CodecError>;
