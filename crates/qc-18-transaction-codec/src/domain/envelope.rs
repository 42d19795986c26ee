//! # Envelope Encoder/Decoder
//!
//! Maps transactions to and from their canonical byte layout.
//!
//! ## Layouts
//!
//! ```text
//! Legacy:     rlp([nonce, gasPrice, gasLimit, to, value, data])
//!             rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])   unsigned, EIP-155
//!             rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])         signed
//! EIP-2930:   0x01 || rlp([chainId, nonce, gasPrice, gasLimit, to, value, data, accessList (, yParity, r, s)])
//! EIP-1559:   0x02 || rlp([chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gasLimit, to, value,
//!                          data, accessList (, yParity, r, s)])
//! ```
//!
//! The decoder dispatches on the first byte only: `0xc0..=0xff` opens a
//! legacy list, `0x01`/`0x02` select a typed payload, any other byte up to
//! `0x7f` is an unknown type.

use super::ecdsa;
use super::entities::{
    AccessListItem, AccessListTx, Address, DecodedTransaction, DynamicFeeTx, LegacyTx,
    SignedTransaction, Transaction, TxSignature, TxType,
};
use super::errors::{CodecError, CodecResult};
use super::rlp::{self, Item, RlpError};
use primitive_types::U256;

const LEGACY_UNSIGNED_FIELDS: usize = 6;
const ACCESS_LIST_UNSIGNED_FIELDS: usize = 8;
const DYNAMIC_FEE_UNSIGNED_FIELDS: usize = 9;
/// `[v, r, s]` or `[chainId, 0, 0]`.
const TRAILER_FIELDS: usize = 3;

// =============================================================================
// ENCODING
// =============================================================================

/// Encode the payload that is hashed for signing.
pub fn encode_unsigned(tx: &Transaction) -> Vec<u8> {
    encode(tx, None)
}

/// Encode the full signed envelope.
pub fn encode_signed(signed: &SignedTransaction) -> Vec<u8> {
    encode(signed.transaction(), Some(signed.signature()))
}

/// Encode a transaction, appending `[v, r, s]` when a signature is given.
pub fn encode(tx: &Transaction, signature: Option<&TxSignature>) -> Vec<u8> {
    let mut payload = Vec::with_capacity(128);

    match tx {
        Transaction::Legacy(tx) => {
            rlp::encode_u64(&mut payload, tx.nonce);
            rlp::encode_u256(&mut payload, &tx.gas_price);
            rlp::encode_u64(&mut payload, tx.gas_limit);
            encode_to(&mut payload, tx.to.as_ref());
            rlp::encode_u256(&mut payload, &tx.value);
            rlp::encode_bytes(&mut payload, &tx.data);

            if signature.is_none() {
                if let Some(chain_id) = tx.replay_chain_id() {
                    rlp::encode_u64(&mut payload, chain_id);
                    rlp::encode_u64(&mut payload, 0);
                    rlp::encode_u64(&mut payload, 0);
                }
            }
        }
        Transaction::AccessList(tx) => {
            rlp::encode_u64(&mut payload, tx.chain_id);
            rlp::encode_u64(&mut payload, tx.nonce);
            rlp::encode_u256(&mut payload, &tx.gas_price);
            rlp::encode_u64(&mut payload, tx.gas_limit);
            encode_to(&mut payload, tx.to.as_ref());
            rlp::encode_u256(&mut payload, &tx.value);
            rlp::encode_bytes(&mut payload, &tx.data);
            encode_access_list(&mut payload, &tx.access_list);
        }
        Transaction::DynamicFee(tx) => {
            rlp::encode_u64(&mut payload, tx.chain_id);
            rlp::encode_u64(&mut payload, tx.nonce);
            rlp::encode_u256(&mut payload, &tx.max_priority_fee_per_gas);
            rlp::encode_u256(&mut payload, &tx.max_fee_per_gas);
            rlp::encode_u64(&mut payload, tx.gas_limit);
            encode_to(&mut payload, tx.to.as_ref());
            rlp::encode_u256(&mut payload, &tx.value);
            rlp::encode_bytes(&mut payload, &tx.data);
            encode_access_list(&mut payload, &tx.access_list);
        }
    }

    if let Some(signature) = signature {
        rlp::encode_u64(&mut payload, signature.v);
        rlp::encode_word(&mut payload, &signature.r);
        rlp::encode_word(&mut payload, &signature.s);
    }

    let mut out = Vec::with_capacity(payload.len() + 10);
    if tx.tx_type() != TxType::Legacy {
        out.push(tx.tx_type().as_u8());
    }
    rlp::encode_list(&mut out, &payload);
    out
}

fn encode_to(out: &mut Vec<u8>, to: Option<&Address>) {
    match to {
        Some(address) => rlp::encode_bytes(out, address),
        None => rlp::encode_bytes(out, &[]),
    }
}

fn encode_access_list(out: &mut Vec<u8>, access_list: &[AccessListItem]) {
    let mut items = Vec::new();
    for item in access_list {
        let mut keys = Vec::with_capacity(item.storage_keys.len() * 33);
        for key in &item.storage_keys {
            rlp::encode_bytes(&mut keys, key);
        }

        let mut entry = Vec::with_capacity(keys.len() + 24);
        rlp::encode_bytes(&mut entry, &item.address);
        rlp::encode_list(&mut entry, &keys);

        rlp::encode_list(&mut items, &entry);
    }
    rlp::encode_list(out, &items);
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode an envelope, detecting its type from the first byte.
pub fn decode(bytes: &[u8]) -> CodecResult<DecodedTransaction> {
    let first = *bytes
        .first()
        .ok_or_else(|| CodecError::MalformedEncoding("empty input".into()))?;

    match first {
        0xc0..=0xff => decode_legacy(bytes),
        0x01 => decode_access_list_tx(&bytes[1..]),
        0x02 => decode_dynamic_fee_tx(&bytes[1..]),
        0x00..=0x7f => Err(CodecError::InvalidType(first as u64)),
        _ => Err(CodecError::MalformedEncoding(format!(
            "envelope must start with a list or a type byte, found 0x{:02x}",
            first
        ))),
    }
}

fn decode_legacy(bytes: &[u8]) -> CodecResult<DecodedTransaction> {
    let items = rlp::decode_list(bytes)?;
    check_arity(&items, LEGACY_UNSIGNED_FIELDS, "legacy")?;

    let mut tx = LegacyTx {
        chain_id: None,
        nonce: field_u64(&items[0], "nonce")?,
        gas_price: field_u256(&items[1], "gasPrice")?,
        gas_limit: field_u64(&items[2], "gasLimit")?,
        to: field_to(&items[3])?,
        value: field_u256(&items[4], "value")?,
        data: field_bytes(&items[5], "data")?,
    };

    if items.len() == LEGACY_UNSIGNED_FIELDS {
        return Ok(DecodedTransaction::Unsigned(Transaction::Legacy(tx)));
    }

    let v = field_u64(&items[6], "v")?;
    let r = field_word(&items[7], "r")?;
    let s = field_word(&items[8], "s")?;

    // EIP-155 signing payload: [.., chainId, 0, 0]
    if r == [0u8; 32] && s == [0u8; 32] {
        tx.chain_id = Some(v).filter(|&chain_id| chain_id != 0);
        return Ok(DecodedTransaction::Unsigned(Transaction::Legacy(tx)));
    }

    tx.chain_id = ecdsa::legacy_chain_id_from_v(v)?;
    let signed = SignedTransaction::new(Transaction::Legacy(tx), TxSignature { r, s, v })?;
    Ok(DecodedTransaction::Signed(signed))
}

fn decode_access_list_tx(payload: &[u8]) -> CodecResult<DecodedTransaction> {
    let items = rlp::decode_list(payload)?;
    check_arity(&items, ACCESS_LIST_UNSIGNED_FIELDS, "EIP-2930")?;

    let tx = Transaction::AccessList(AccessListTx {
        chain_id: field_u64(&items[0], "chainId")?,
        nonce: field_u64(&items[1], "nonce")?,
        gas_price: field_u256(&items[2], "gasPrice")?,
        gas_limit: field_u64(&items[3], "gasLimit")?,
        to: field_to(&items[4])?,
        value: field_u256(&items[5], "value")?,
        data: field_bytes(&items[6], "data")?,
        access_list: field_access_list(&items[7])?,
    });

    attach_typed_signature(tx, &items[ACCESS_LIST_UNSIGNED_FIELDS..])
}

fn decode_dynamic_fee_tx(payload: &[u8]) -> CodecResult<DecodedTransaction> {
    let items = rlp::decode_list(payload)?;
    check_arity(&items, DYNAMIC_FEE_UNSIGNED_FIELDS, "EIP-1559")?;

    let tx = Transaction::DynamicFee(DynamicFeeTx {
        chain_id: field_u64(&items[0], "chainId")?,
        nonce: field_u64(&items[1], "nonce")?,
        max_priority_fee_per_gas: field_u256(&items[2], "maxPriorityFeePerGas")?,
        max_fee_per_gas: field_u256(&items[3], "maxFeePerGas")?,
        gas_limit: field_u64(&items[4], "gasLimit")?,
        to: field_to(&items[5])?,
        value: field_u256(&items[6], "value")?,
        data: field_bytes(&items[7], "data")?,
        access_list: field_access_list(&items[8])?,
    });

    attach_typed_signature(tx, &items[DYNAMIC_FEE_UNSIGNED_FIELDS..])
}

fn attach_typed_signature(
    tx: Transaction,
    trailer: &[Item<'_>],
) -> CodecResult<DecodedTransaction> {
    if trailer.is_empty() {
        return Ok(DecodedTransaction::Unsigned(tx));
    }

    let signature = TxSignature {
        v: field_u64(&trailer[0], "yParity")?,
        r: field_word(&trailer[1], "r")?,
        s: field_word(&trailer[2], "s")?,
    };
    Ok(DecodedTransaction::Signed(SignedTransaction::new(
        tx, signature,
    )?))
}

/// Field count must be exactly the unsigned or the signed arity.
fn check_arity(items: &[Item<'_>], unsigned: usize, kind: &str) -> CodecResult<()> {
    let signed = unsigned + TRAILER_FIELDS;
    if items.len() != unsigned && items.len() != signed {
        return Err(CodecError::MalformedEncoding(format!(
            "{} transaction must have {} or {} fields, got {}",
            kind,
            unsigned,
            signed,
            items.len()
        )));
    }
    Ok(())
}

fn field_u64(item: &Item<'_>, field: &str) -> CodecResult<u64> {
    item.as_u64().map_err(|e| field_error(field, e))
}

fn field_u256(item: &Item<'_>, field: &str) -> CodecResult<U256> {
    item.as_u256().map_err(|e| field_error(field, e))
}

fn field_word(item: &Item<'_>, field: &str) -> CodecResult<[u8; 32]> {
    item.as_word().map_err(|e| field_error(field, e))
}

fn field_bytes(item: &Item<'_>, field: &str) -> CodecResult<Vec<u8>> {
    item.as_bytes()
        .map(<[u8]>::to_vec)
        .map_err(|e| field_error(field, e))
}

/// Empty string means contract creation; otherwise exactly 20 bytes.
fn field_to(item: &Item<'_>) -> CodecResult<Option<Address>> {
    let bytes = item.as_bytes().map_err(|e| field_error("to", e))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    item.as_fixed::<20>()
        .map(Some)
        .map_err(|e| field_error("to", e))
}

fn field_access_list(item: &Item<'_>) -> CodecResult<Vec<AccessListItem>> {
    let entries = item.as_list().map_err(|e| field_error("accessList", e))?;

    entries
        .iter()
        .map(|entry| {
            let parts = entry.as_list().map_err(|e| field_error("accessList", e))?;
            if parts.len() != 2 {
                return Err(CodecError::MalformedEncoding(format!(
                    "accessList: entry must have 2 fields, got {}",
                    parts.len()
                )));
            }

            let address = parts[0]
                .as_fixed::<20>()
                .map_err(|e| field_error("accessList.address", e))?;
            let storage_keys = parts[1]
                .as_list()
                .map_err(|e| field_error("accessList.storageKeys", e))?
                .iter()
                .map(|key| {
                    key.as_fixed::<32>()
                        .map_err(|e| field_error("accessList.storageKeys", e))
                })
                .collect::<CodecResult<Vec<_>>>()?;

            Ok(AccessListItem {
                address,
                storage_keys,
            })
        })
        .collect()
}

fn field_error(field: &str, e: RlpError) -> CodecError {
    CodecError::MalformedEncoding(format!("{}: {}", field, e))
}
