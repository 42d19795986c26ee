//! Codec configuration with validation.
//!
//! Generation defaults fill fields the caller leaves out when building a new
//! transaction. Decode limits bound untrusted input.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{TxType, GWEI};

/// Largest envelope accepted by default (128 KiB).
pub const DEFAULT_MAX_ENVELOPE_BYTES: usize = 128 * 1024;

/// Main codec configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Defaults for the generation path
    pub generation: GenerationDefaults,
    /// Input bounds for the decode path
    pub limits: DecodeLimits,
}

impl CodecConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()?;
        self.limits.validate()
    }

    /// Parse and validate a JSON document. Missing sections keep defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Values used for fields absent from a generation request.
///
/// Decoding never consults these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationDefaults {
    /// Transaction type when `type` is omitted (default: 2)
    #[serde(rename = "type")]
    pub tx_type: TxType,
    /// Chain id (default: 1, mainnet)
    pub chain_id: u64,
    pub nonce: u64,
    /// Gas limit (default: 21000, a plain transfer)
    pub gas_limit: u64,
    pub value: U256,
    /// Legacy and EIP-2930 gas price (default: 1 gwei)
    pub gas_price: U256,
    /// EIP-1559 fee cap (default: 2 gwei)
    pub max_fee_per_gas: U256,
    /// EIP-1559 tip (default: 1 gwei)
    pub max_priority_fee_per_gas: U256,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            tx_type: TxType::DynamicFee,
            chain_id: 1,
            nonce: 0,
            gas_limit: 21_000,
            value: U256::zero(),
            gas_price: U256::from(GWEI),
            max_fee_per_gas: U256::from(2 * GWEI),
            max_priority_fee_per_gas: U256::from(GWEI),
        }
    }
}

impl GenerationDefaults {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.gas_limit == 0 {
            return Err(ConfigError::InvalidDefault("gasLimit cannot be 0".into()));
        }
        if self.max_fee_per_gas < self.max_priority_fee_per_gas {
            return Err(ConfigError::InvalidDefault(
                "maxFeePerGas must be >= maxPriorityFeePerGas".into(),
            ));
        }
        Ok(())
    }
}

/// Bounds applied before decoding untrusted envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeLimits {
    /// Maximum decoded envelope size in bytes (default: 128 KiB)
    pub max_envelope_bytes: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_envelope_bytes: DEFAULT_MAX_ENVELOPE_BYTES,
        }
    }
}

impl DecodeLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_envelope_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "maxEnvelopeBytes cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Generation default that could never produce a usable transaction
    #[error("invalid default: {0}")]
    InvalidDefault(String),
    /// Malformed configuration document
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
