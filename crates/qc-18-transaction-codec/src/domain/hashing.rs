//! # Hash Engine
//!
//! Keccak-256 digests that identify and authorize transactions, plus the
//! address helpers built on them.
//!
//! - `signing_hash = keccak256(unsigned envelope)`
//! - `final_hash   = keccak256(signed envelope)`, the transaction hash
//!
//! The SHA-256 [`integrity_digest`] is a checksum of hex text for display.
//! It is not a transaction identifier.

use super::entities::{Address, Hash, SignedTransaction, Transaction};
use super::envelope;
use super::hexutil;
use k256::ecdsa::VerifyingKey;
use sha2::Sha256;
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive an address from a public key: the low 20 bytes of the Keccak-256
/// of the uncompressed point without its `0x04` prefix.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Hash that is signed to authorize `tx`.
pub fn signing_hash(tx: &Transaction) -> Hash {
    keccak256(&envelope::encode_unsigned(tx))
}

/// Transaction hash of a signed envelope.
pub fn final_hash(signed: &SignedTransaction) -> Hash {
    keccak256(&envelope::encode_signed(signed))
}

/// SHA-256 of the `0x`-prefixed hex text, lowercase hex without prefix.
pub fn integrity_digest(raw_hex: &str) -> String {
    let normalized = hexutil::normalize(raw_hex);
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// EIP-55 mixed-case checksum encoding, `0x`-prefixed.
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

impl Transaction {
    /// See [`signing_hash`].
    pub fn signing_hash(&self) -> Hash {
        signing_hash(self)
    }
}

impl SignedTransaction {
    /// See [`final_hash`].
    pub fn hash(&self) -> Hash {
        final_hash(self)
    }
}
