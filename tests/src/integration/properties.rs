//! Property-based tests for envelope round trips and signing.

#[cfg(test)]
mod tests {
    use primitive_types::U256;
    use proptest::prelude::*;
    use qc_18_transaction_codec::{
        decode, encode_signed, encode_unsigned, AccessListItem, AccessListTx, DecodedTransaction,
        DynamicFeeTx, LegacyTx, PrivateKey, Transaction, TxType,
    };

    // ========================================================================
    // Strategies for generating random transaction data
    // ========================================================================

    fn arb_u256() -> impl Strategy<Value = U256> {
        prop_oneof![
            Just(U256::zero()),
            any::<u64>().prop_map(U256::from),
            prop::array::uniform32(any::<u8>()).prop_map(|bytes| U256::from_big_endian(&bytes)),
        ]
    }

    fn arb_to() -> impl Strategy<Value = Option<[u8; 20]>> {
        prop::option::of(prop::array::uniform20(any::<u8>()))
    }

    fn arb_data() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 0..300)
    }

    fn arb_access_list() -> impl Strategy<Value = Vec<AccessListItem>> {
        prop::collection::vec(
            (
                prop::array::uniform20(any::<u8>()),
                prop::collection::vec(prop::array::uniform32(any::<u8>()), 0..4),
            )
                .prop_map(|(address, storage_keys)| AccessListItem {
                    address,
                    storage_keys,
                }),
            0..4,
        )
    }

    /// Replay-protected chain ids small enough that `chain_id * 2 + 36` fits
    /// in a u64. Chain id 0 is unprotected and decodes as `None`.
    fn arb_chain_id() -> impl Strategy<Value = u64> {
        1u64..(u64::MAX / 4)
    }

    fn arb_legacy_tx() -> impl Strategy<Value = Transaction> {
        (
            prop::option::of(arb_chain_id()),
            any::<u64>(),
            arb_u256(),
            any::<u64>(),
            arb_to(),
            arb_u256(),
            arb_data(),
        )
            .prop_map(|(chain_id, nonce, gas_price, gas_limit, to, value, data)| {
                Transaction::Legacy(LegacyTx {
                    chain_id,
                    nonce,
                    gas_price,
                    gas_limit,
                    to,
                    value,
                    data,
                })
            })
    }

    fn arb_access_list_tx() -> impl Strategy<Value = Transaction> {
        (
            any::<u64>(),
            any::<u64>(),
            arb_u256(),
            any::<u64>(),
            arb_to(),
            arb_u256(),
            arb_data(),
            arb_access_list(),
        )
            .prop_map(
                |(chain_id, nonce, gas_price, gas_limit, to, value, data, access_list)| {
                    Transaction::AccessList(AccessListTx {
                        chain_id,
                        nonce,
                        gas_price,
                        gas_limit,
                        to,
                        value,
                        data,
                        access_list,
                    })
                },
            )
    }

    fn arb_dynamic_fee_tx() -> impl Strategy<Value = Transaction> {
        (
            (any::<u64>(), any::<u64>(), arb_u256(), arb_u256()),
            (any::<u64>(), arb_to(), arb_u256(), arb_data(), arb_access_list()),
        )
            .prop_map(
                |(
                    (chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas),
                    (gas_limit, to, value, data, access_list),
                )| {
                    Transaction::DynamicFee(DynamicFeeTx {
                        chain_id,
                        nonce,
                        max_priority_fee_per_gas,
                        max_fee_per_gas,
                        gas_limit,
                        to,
                        value,
                        data,
                        access_list,
                    })
                },
            )
    }

    fn arb_transaction() -> impl Strategy<Value = Transaction> {
        prop_oneof![arb_legacy_tx(), arb_access_list_tx(), arb_dynamic_fee_tx()]
    }

    fn arb_key() -> impl Strategy<Value = PrivateKey> {
        prop::array::uniform32(any::<u8>())
            .prop_filter_map("scalar out of range", |bytes| {
                PrivateKey::from_bytes(&bytes).ok()
            })
    }

    // ========================================================================
    // Property Tests
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Property: decoding an unsigned encoding gives back the transaction
        #[test]
        fn prop_unsigned_roundtrip(tx in arb_transaction()) {
            let encoded = encode_unsigned(&tx);
            prop_assert_eq!(decode(&encoded).unwrap(), DecodedTransaction::Unsigned(tx));
        }

        /// Property: typed envelopes start with their type byte, legacy never does
        #[test]
        fn prop_type_discrimination(tx in arb_transaction()) {
            let encoded = encode_unsigned(&tx);
            match tx.tx_type() {
                TxType::Legacy => prop_assert!(encoded[0] >= 0xc0),
                typed => prop_assert_eq!(encoded[0], typed.as_u8()),
            }
        }

        /// Property: the decoder returns a result for any input, never panics
        #[test]
        fn prop_decode_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode(&bytes);
        }

        /// Property: truncating a valid envelope always fails to decode
        #[test]
        fn prop_truncation_rejected(tx in arb_transaction(), cut in 1usize..32) {
            let encoded = encode_unsigned(&tx);
            let keep = encoded.len().saturating_sub(cut);
            prop_assert!(decode(&encoded[..keep]).is_err());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        /// Property: signed envelopes round trip and recover the signer
        #[test]
        fn prop_signed_roundtrip(tx in arb_transaction(), key in arb_key()) {
            let signing_hash = tx.signing_hash();
            let signed = tx.sign(&key).unwrap();
            let encoded = encode_signed(&signed);

            let decoded = decode(&encoded).unwrap();
            prop_assert_eq!(&decoded, &DecodedTransaction::Signed(signed.clone()));
            prop_assert_eq!(decoded.transaction().signing_hash(), signing_hash);
            prop_assert_eq!(signed.recover_signer().unwrap(), key.address());
        }

        /// Property: legacy chain id 0 signs exactly like no chain id
        #[test]
        fn prop_legacy_chain_zero_is_unprotected(tx in arb_legacy_tx(), key in arb_key()) {
            let Transaction::Legacy(mut fields) = tx else {
                unreachable!();
            };
            fields.chain_id = None;
            let unprotected = Transaction::Legacy(fields.clone());
            fields.chain_id = Some(0);
            let chain_zero = Transaction::Legacy(fields);

            prop_assert_eq!(encode_unsigned(&chain_zero), encode_unsigned(&unprotected));
            let signed = chain_zero.sign(&key).unwrap();
            prop_assert!(matches!(signed.signature().v, 27 | 28));
            prop_assert_eq!(signed.hash(), unprotected.sign(&key).unwrap().hash());
        }

        /// Property: signing the same transaction twice is byte-identical
        #[test]
        fn prop_signing_deterministic(tx in arb_transaction(), key in arb_key()) {
            let first = tx.clone().sign(&key).unwrap();
            let second = tx.sign(&key).unwrap();
            prop_assert_eq!(first.signature(), second.signature());
            prop_assert_eq!(first.hash(), second.hash());
        }
    }
}
