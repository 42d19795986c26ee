//! # Transaction Codec Service
//!
//! Application service layer that implements the `TransactionCodecApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`TransactionCodecApi`)
//! - Normalizes hex and enforces decode limits at the boundary
//! - Delegates encoding, hashing and signing to the domain layer
//!
//! Each hash is computed once per call and handed back in the result.

use tracing::{debug, instrument, warn};

use crate::domain::config::CodecConfig;
use crate::domain::ecdsa::{self, PrivateKey};
use crate::domain::entities::{
    DecodedReport, DecodedTransaction, SignedEnvelope, UnsignedEnvelope,
};
use crate::domain::envelope;
use crate::domain::errors::{CodecError, CodecResult};
use crate::domain::hashing::{self, keccak256, to_checksum_address};
use crate::domain::hexutil;
use crate::domain::validation::{self, FieldMap};
use crate::ports::inbound::TransactionCodecApi;

/// Transaction Codec Service.
///
/// Holds only immutable configuration, so one instance can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct TransactionCodecService {
    config: CodecConfig,
}

impl TransactionCodecService {
    /// Create a service, rejecting invalid configuration.
    pub fn new(config: CodecConfig) -> CodecResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Normalize hex input and decode it, enforcing the envelope size limit
    /// before allocating.
    fn read_envelope(&self, raw: &str) -> CodecResult<(String, Vec<u8>)> {
        let max = self.config.limits.max_envelope_bytes;
        let digits = hexutil::strip_prefix(raw).len();
        if digits / 2 > max {
            return Err(CodecError::MalformedEncoding(format!(
                "envelope of {} bytes exceeds limit of {} bytes",
                digits / 2,
                max
            )));
        }

        let raw_hex = hexutil::normalize(raw);
        let bytes = hexutil::decode(&raw_hex)?;
        Ok((raw_hex, bytes))
    }
}

impl TransactionCodecApi for TransactionCodecService {
    #[instrument(skip(self, raw), fields(len = raw.len()))]
    fn decode_hex(&self, raw: &str) -> CodecResult<DecodedReport> {
        let (raw_hex, bytes) = self.read_envelope(raw)?;
        let transaction = envelope::decode(&bytes)?;
        let signing_hash = transaction.transaction().signing_hash();

        let (hash, sender) = match &transaction {
            DecodedTransaction::Unsigned(_) => (None, None),
            DecodedTransaction::Signed(signed) => {
                let signature = signed.signature();
                let sender = ecdsa::recover_address_with_id(
                    &signing_hash,
                    &signature.r,
                    &signature.s,
                    signed.recovery_id(),
                )?;
                // Canonical decoding: the input bytes are the signed encoding.
                (Some(keccak256(&bytes)), Some(sender))
            }
        };

        debug!(
            tx_type = %transaction.transaction().tx_type(),
            signed = transaction.is_signed(),
            sender = ?sender.as_ref().map(to_checksum_address),
            "Decoded transaction envelope"
        );

        Ok(DecodedReport {
            integrity_digest: hashing::integrity_digest(&raw_hex),
            transaction,
            raw_hex,
            signing_hash,
            hash,
            sender,
        })
    }

    #[instrument(skip(self, fields), fields(keys = fields.len()))]
    fn generate_unsigned(&self, fields: &FieldMap) -> CodecResult<UnsignedEnvelope> {
        let transaction = validation::validate(fields, &self.config.generation)?;
        let encoded = envelope::encode_unsigned(&transaction);
        let signing_hash = keccak256(&encoded);
        let raw_hex = hexutil::encode(&encoded);

        debug!(
            tx_type = %transaction.tx_type(),
            signing_hash = %hexutil::encode(&signing_hash),
            "Generated unsigned transaction"
        );

        Ok(UnsignedEnvelope {
            integrity_digest: hashing::integrity_digest(&raw_hex),
            transaction,
            raw_hex,
            signing_hash,
        })
    }

    #[instrument(skip(self, unsigned_hex, private_key_hex))]
    fn sign_hex(&self, unsigned_hex: &str, private_key_hex: &str) -> CodecResult<SignedEnvelope> {
        let key = PrivateKey::from_hex(private_key_hex)?;
        let (_, bytes) = self.read_envelope(unsigned_hex)?;

        let transaction = match envelope::decode(&bytes)? {
            DecodedTransaction::Unsigned(tx) => tx,
            DecodedTransaction::Signed(signed) => {
                warn!(
                    tx_type = %signed.tx_type(),
                    "Input is already signed; replacing existing signature"
                );
                signed.into_parts().0
            }
        };

        let signed = ecdsa::sign_transaction(transaction, &key)?;
        let encoded = envelope::encode_signed(&signed);
        let hash = keccak256(&encoded);
        let signer = key.address();

        debug!(
            tx_type = %signed.tx_type(),
            hash = %hexutil::encode(&hash),
            signer = %to_checksum_address(&signer),
            "Signed transaction"
        );

        Ok(SignedEnvelope {
            signature: *signed.signature(),
            transaction: signed,
            raw_hex: hexutil::encode(&encoded),
            hash,
            signer,
        })
    }
}
