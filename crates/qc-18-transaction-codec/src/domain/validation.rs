//! # Field-Map Validation
//!
//! Turns a loose JSON field map (camelCase keys, as produced by a CLI or an
//! RPC request) into a strict [`Transaction`] variant.
//!
//! ## Rules
//!
//! | Key | Types | Absent |
//! |-----|-------|--------|
//! | `type` | all | default type |
//! | `chainId`, `nonce`, `gasLimit`, `value` | all | default |
//! | `to` | all | **error**; `null` or `""` creates a contract |
//! | `data` | all | empty |
//! | `gasPrice` | 0, 1 | default |
//! | `maxFeePerGas`, `maxPriorityFeePerGas` | 2 | default |
//! | `accessList` | 1, 2 | empty |
//!
//! Unknown keys and keys that do not apply to the type are rejected rather
//! than ignored. Numbers may be JSON integers, decimal strings or `0x` hex
//! strings, all in wei.

use std::collections::BTreeMap;

use primitive_types::U256;
use serde_json::Value;
use tracing::warn;

use super::config::GenerationDefaults;
use super::entities::{
    AccessListItem, AccessListTx, Address, DynamicFeeTx, LegacyTx, StorageKey, Transaction,
    TxType,
};
use super::errors::{CodecError, CodecResult};
use super::hashing::to_checksum_address;
use super::hexutil;

/// Loose transaction fields keyed by their camelCase names.
pub type FieldMap = BTreeMap<String, Value>;

const KNOWN_FIELDS: [&str; 11] = [
    "type",
    "chainId",
    "nonce",
    "gasPrice",
    "maxFeePerGas",
    "maxPriorityFeePerGas",
    "gasLimit",
    "to",
    "value",
    "data",
    "accessList",
];

/// Build a transaction from `fields`, filling gaps from `defaults`.
pub fn validate(fields: &FieldMap, defaults: &GenerationDefaults) -> CodecResult<Transaction> {
    if let Some(unknown) = fields.keys().find(|k| !KNOWN_FIELDS.contains(&k.as_str())) {
        return Err(CodecError::field(unknown.as_str(), "unknown field"));
    }

    let tx_type = match fields.get("type") {
        Some(value) => TxType::try_from(parse_u64(value, "type")?)?,
        None => defaults.tx_type,
    };
    check_applicable(fields, tx_type)?;

    let chain_id = optional(fields, "chainId", parse_u64)?.unwrap_or(defaults.chain_id);
    let nonce = optional(fields, "nonce", parse_u64)?.unwrap_or(defaults.nonce);
    let gas_limit = optional(fields, "gasLimit", parse_u64)?.unwrap_or(defaults.gas_limit);
    let value = optional(fields, "value", parse_u256)?.unwrap_or(defaults.value);
    let to = parse_to(fields.get("to"))?;
    let data = optional(fields, "data", parse_data)?.unwrap_or_default();

    let tx = match tx_type {
        TxType::Legacy => Transaction::Legacy(LegacyTx {
            // Chain id 0 opts out of replay protection.
            chain_id: (chain_id != 0).then_some(chain_id),
            nonce,
            gas_price: optional(fields, "gasPrice", parse_u256)?.unwrap_or(defaults.gas_price),
            gas_limit,
            to,
            value,
            data,
        }),
        TxType::AccessList => Transaction::AccessList(AccessListTx {
            chain_id,
            nonce,
            gas_price: optional(fields, "gasPrice", parse_u256)?.unwrap_or(defaults.gas_price),
            gas_limit,
            to,
            value,
            data,
            access_list: optional(fields, "accessList", parse_access_list)?.unwrap_or_default(),
        }),
        TxType::DynamicFee => {
            let max_fee_per_gas = optional(fields, "maxFeePerGas", parse_u256)?
                .unwrap_or(defaults.max_fee_per_gas);
            let max_priority_fee_per_gas = optional(fields, "maxPriorityFeePerGas", parse_u256)?
                .unwrap_or(defaults.max_priority_fee_per_gas);

            if max_fee_per_gas < max_priority_fee_per_gas {
                warn!(
                    max_fee_per_gas = %max_fee_per_gas,
                    max_priority_fee_per_gas = %max_priority_fee_per_gas,
                    "maxFeePerGas is below maxPriorityFeePerGas"
                );
            }

            Transaction::DynamicFee(DynamicFeeTx {
                chain_id,
                nonce,
                max_priority_fee_per_gas,
                max_fee_per_gas,
                gas_limit,
                to,
                value,
                data,
                access_list: optional(fields, "accessList", parse_access_list)?
                    .unwrap_or_default(),
            })
        }
    };

    Ok(tx)
}

fn check_applicable(fields: &FieldMap, tx_type: TxType) -> CodecResult<()> {
    let rejected: &[&str] = match tx_type {
        TxType::Legacy => &["maxFeePerGas", "maxPriorityFeePerGas", "accessList"],
        TxType::AccessList => &["maxFeePerGas", "maxPriorityFeePerGas"],
        TxType::DynamicFee => &["gasPrice"],
    };

    match rejected.iter().find(|key| fields.contains_key(**key)) {
        Some(key) => Err(CodecError::field(
            *key,
            format!("not applicable to type {}", tx_type),
        )),
        None => Ok(()),
    }
}

fn optional<T>(
    fields: &FieldMap,
    key: &str,
    parse: impl Fn(&Value, &str) -> CodecResult<T>,
) -> CodecResult<Option<T>> {
    fields.get(key).map(|value| parse(value, key)).transpose()
}

// =============================================================================
// SCALARS
// =============================================================================

fn parse_u256(value: &Value, field: &str) -> CodecResult<U256> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| CodecError::field(field, "must be a non-negative integer")),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(CodecError::field(field, "empty quantity"));
            }
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some("") => return Err(CodecError::field(field, "empty hex quantity")),
                Some(digits) => U256::from_str_radix(digits, 16).ok(),
                None => U256::from_dec_str(s).ok(),
            };
            parsed.ok_or_else(|| CodecError::field(field, format!("invalid quantity `{}`", s)))
        }
        _ => Err(CodecError::field(field, "expected number or string")),
    }
}

fn parse_u64(value: &Value, field: &str) -> CodecResult<u64> {
    let wide = parse_u256(value, field)?;
    if wide > U256::from(u64::MAX) {
        return Err(CodecError::field(field, "exceeds u64"));
    }
    Ok(wide.as_u64())
}

fn parse_data(value: &Value, field: &str) -> CodecResult<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| CodecError::field(field, "expected hex string"))?;
    hex::decode(hexutil::strip_prefix(s)).map_err(|e| CodecError::field(field, e.to_string()))
}

/// `to` must be present; `null` or `""` means contract creation.
fn parse_to(value: Option<&Value>) -> CodecResult<Option<Address>> {
    match value {
        None => Err(CodecError::field(
            "to",
            "required (use null for contract creation)",
        )),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if hexutil::strip_prefix(s).is_empty() => Ok(None),
        Some(Value::String(s)) => parse_address(s, "to").map(Some),
        Some(_) => Err(CodecError::field("to", "expected address string or null")),
    }
}

/// Parse a 20-byte address. Mixed-case input must carry a valid EIP-55
/// checksum; all-lowercase or all-uppercase input is taken as is.
pub fn parse_address(raw: &str, field: &str) -> CodecResult<Address> {
    let digits = hexutil::strip_prefix(raw);
    if digits.len() != 40 {
        return Err(CodecError::field(
            field,
            format!("address must be 20 bytes, got {} hex digits", digits.len()),
        ));
    }

    let mut address = [0u8; 20];
    hex::decode_to_slice(digits, &mut address)
        .map_err(|e| CodecError::field(field, e.to_string()))?;

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum_address(&address)[2..] != *digits {
        return Err(CodecError::field(field, "invalid EIP-55 checksum"));
    }

    Ok(address)
}

fn parse_storage_key(value: &Value, field: &str) -> CodecResult<StorageKey> {
    let s = value
        .as_str()
        .ok_or_else(|| CodecError::field(field, "expected hex string"))?;
    let digits = hexutil::strip_prefix(s);
    if digits.len() != 64 {
        return Err(CodecError::field(
            field,
            format!("storage key must be 32 bytes, got {} hex digits", digits.len()),
        ));
    }

    let mut key = [0u8; 32];
    hex::decode_to_slice(digits, &mut key).map_err(|e| CodecError::field(field, e.to_string()))?;
    Ok(key)
}

// =============================================================================
// ACCESS LIST
// =============================================================================

/// Accepts `[{"address": .., "storageKeys": [..]}]` or `[[address, [..]]]`.
fn parse_access_list(value: &Value, field: &str) -> CodecResult<Vec<AccessListItem>> {
    let entries = value
        .as_array()
        .ok_or_else(|| CodecError::field(field, "expected array"))?;

    entries
        .iter()
        .map(|entry| {
            let (address, keys) = match entry {
                Value::Object(obj) => {
                    if let Some(extra) = obj
                        .keys()
                        .find(|k| k.as_str() != "address" && k.as_str() != "storageKeys")
                    {
                        return Err(CodecError::field(
                            format!("{}.{}", field, extra),
                            "unknown field",
                        ));
                    }
                    (obj.get("address"), obj.get("storageKeys"))
                }
                Value::Array(pair) if pair.len() == 2 => (pair.first(), pair.get(1)),
                _ => {
                    return Err(CodecError::field(
                        field,
                        "entry must be {address, storageKeys} or [address, storageKeys]",
                    ))
                }
            };

            let address_field = format!("{}.address", field);
            let address = address
                .and_then(Value::as_str)
                .ok_or_else(|| CodecError::field(address_field.as_str(), "expected address string"))
                .and_then(|s| parse_address(s, &address_field))?;

            let keys_field = format!("{}.storageKeys", field);
            let storage_keys = match keys {
                None => Vec::new(),
                Some(Value::Array(keys)) => keys
                    .iter()
                    .map(|key| parse_storage_key(key, &keys_field))
                    .collect::<CodecResult<Vec<_>>>()?,
                Some(_) => return Err(CodecError::field(keys_field, "expected array")),
            };

            Ok(AccessListItem {
                address,
                storage_keys,
            })
        })
        .collect()
}
