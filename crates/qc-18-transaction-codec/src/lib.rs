//! # Transaction Codec Subsystem (QC-18)
//!
//! Canonical encoding, hashing and signing of Ethereum-style transactions:
//! Legacy (type 0, with optional EIP-155 replay protection), EIP-2930
//! access list (type 1) and EIP-1559 fee market (type 2).
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): RLP, envelopes, hashes and secp256k1, no I/O
//! - **Ports Layer** (`ports/`): The inbound `TransactionCodecApi` trait
//! - **Service Layer** (`service.rs`): Wires domain logic to the port
//!
//! ## Flow
//!
//! ```text
//! fields ──validate──→ Transaction ──encode_unsigned──→ keccak256 ──sign──→ SignedTransaction
//!                          ↑                                                      │
//!   hex ──decode───────────┴──────────────────────────────────── encode_signed ←──┘
//! ```
//!
//! ## Security Notes
//!
//! - **Deterministic Signatures**: RFC 6979 nonces, low-S only (EIP-2)
//! - **Replay Protection**: legacy `v` binds the chain id (EIP-155); typed
//!   envelopes carry it as a field
//! - **Strict Decoding**: non-canonical RLP, unknown types and wrong field
//!   counts are rejected, never repaired

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::config::{CodecConfig, ConfigError, DecodeLimits, GenerationDefaults};
pub use domain::ecdsa::{
    recover_address, sign_prehash, sign_transaction, signature_v, PrivateKey,
    RecoverableSignature,
};
pub use domain::entities::{
    AccessListItem, AccessListTx, Address, DecodedReport, DecodedTransaction, DynamicFeeTx, Hash,
    LegacyTx, SignedEnvelope, SignedTransaction, StorageKey, Transaction, TxSignature, TxType,
    UnsignedEnvelope, GWEI,
};
pub use domain::envelope::{decode, encode_signed, encode_unsigned};
pub use domain::errors::{CodecError, CodecResult, SignatureError};
pub use domain::hashing::{
    address_from_pubkey, final_hash, integrity_digest, keccak256, signing_hash,
    to_checksum_address,
};
pub use domain::validation::{validate, FieldMap};
pub use ports::inbound::TransactionCodecApi;
pub use service::TransactionCodecService;
