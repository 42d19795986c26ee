//! # Differential Checks
//!
//! Cross-checks the codec against independent implementations:
//!
//! - **libsecp256k1** (`secp256k1` crate): RFC 6979 signatures, recovery ids
//!   and public key recovery must agree bit for bit
//! - **Parity `rlp`**: legacy envelopes built with `RlpStream` must match
//!   the codec's bytes, and the codec's output must parse with `Rlp`

#[cfg(test)]
mod tests {
    use super::super::{init_tracing, random_key};
    use primitive_types::U256;
    use qc_18_transaction_codec::{
        decode, encode_signed, encode_unsigned, keccak256, sign_prehash, AccessListItem,
        AccessListTx, DecodedTransaction, DynamicFeeTx, LegacyTx, Transaction, GWEI,
    };
    use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
    use secp256k1::{Message, Secp256k1, SecretKey};

    fn legacy(chain_id: Option<u64>, data: Vec<u8>) -> Transaction {
        Transaction::Legacy(LegacyTx {
            chain_id,
            nonce: 9,
            gas_price: U256::from(20 * GWEI),
            gas_limit: 21_000,
            to: Some([0x35; 20]),
            value: U256::from(10u64).pow(U256::from(18)),
            data,
        })
    }

    fn u256_bytes(value: &U256) -> Vec<u8> {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(32);
        bytes[start..].to_vec()
    }

    // =========================================================================
    // secp256k1
    // =========================================================================

    /// Test: signatures match libsecp256k1 for random keys and hashes
    #[test]
    fn test_signatures_match_libsecp256k1() {
        init_tracing();
        let secp = Secp256k1::new();

        for i in 0..32u8 {
            let (hex_key, key) = random_key();
            let secret = SecretKey::from_slice(&hex::decode(&hex_key[2..]).unwrap()).unwrap();
            let hash = keccak256(&[i; 7]);

            let ours = sign_prehash(&hash, &key).unwrap();
            let theirs = secp.sign_ecdsa_recoverable(&Message::from_digest(hash), &secret);
            let (recovery_id, compact) = theirs.serialize_compact();

            assert_eq!(&compact[..32], &ours.r);
            assert_eq!(&compact[32..], &ours.s);
            assert_eq!(recovery_id.to_i32(), ours.recovery_id as i32);
        }
    }

    /// Test: libsecp256k1 recovers the same signer from a signed envelope
    #[test]
    fn test_recovery_matches_libsecp256k1() {
        let secp = Secp256k1::new();
        let (_, key) = random_key();
        let signed = legacy(Some(1), vec![]).sign(&key).unwrap();
        let signature = signed.signature();

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&signature.r);
        compact[32..].copy_from_slice(&signature.s);
        let recovery_id = RecoveryId::from_i32(signed.recovery_id() as i32).unwrap();
        let recoverable = RecoverableSignature::from_compact(&compact, recovery_id).unwrap();

        let message = Message::from_digest(signed.transaction().signing_hash());
        let public_key = secp.recover_ecdsa(&message, &recoverable).unwrap();
        let uncompressed = public_key.serialize_uncompressed();
        let address = &keccak256(&uncompressed[1..])[12..];

        assert_eq!(address, &key.address());
        assert_eq!(signed.recover_signer().unwrap(), key.address());
    }

    // =========================================================================
    // rlp
    // =========================================================================

    /// Test: legacy envelopes match Parity's RlpStream, short and long data
    #[test]
    fn test_legacy_matches_rlp_stream() {
        for data in [vec![], vec![0x7f], vec![0x80], vec![0xab; 55], vec![0xcd; 1024]] {
            let tx = legacy(Some(1), data.clone());
            let Transaction::Legacy(fields) = &tx else {
                unreachable!();
            };

            let mut stream = rlp::RlpStream::new_list(9);
            stream.append(&fields.nonce);
            stream.append(&u256_bytes(&fields.gas_price));
            stream.append(&fields.gas_limit);
            stream.append(&fields.to.unwrap().to_vec());
            stream.append(&u256_bytes(&fields.value));
            stream.append(&data);
            stream.append(&1u64);
            stream.append_empty_data();
            stream.append_empty_data();

            assert_eq!(encode_unsigned(&tx), stream.out().to_vec(), "data len {}", data.len());
        }
    }

    /// Test: contract creation encodes `to` as the empty string
    #[test]
    fn test_contract_creation_matches_rlp_stream() {
        let tx = Transaction::Legacy(LegacyTx {
            chain_id: None,
            nonce: 0,
            gas_price: U256::from(GWEI),
            gas_limit: 1_000_000,
            to: None,
            value: U256::zero(),
            data: vec![0x60, 0x80],
        });

        let mut stream = rlp::RlpStream::new_list(6);
        stream.append(&0u64);
        stream.append(&GWEI);
        stream.append(&1_000_000u64);
        stream.append_empty_data();
        stream.append_empty_data();
        stream.append(&vec![0x60u8, 0x80]);

        assert_eq!(encode_unsigned(&tx), stream.out().to_vec());
    }

    /// Test: typed payloads parse as well-formed RLP lists of the right arity
    #[test]
    fn test_typed_payloads_parse_with_rlp() {
        let (_, key) = random_key();
        let access_list = vec![AccessListItem {
            address: [0x11; 20],
            storage_keys: vec![[0x22; 32], [0x33; 32]],
        }];
        let cases = [
            (
                Transaction::AccessList(AccessListTx {
                    chain_id: 1,
                    gas_limit: 30_000,
                    access_list: access_list.clone(),
                    ..AccessListTx::default()
                }),
                8,
            ),
            (
                Transaction::DynamicFee(DynamicFeeTx {
                    chain_id: 1,
                    gas_limit: 30_000,
                    max_fee_per_gas: U256::from(30 * GWEI),
                    max_priority_fee_per_gas: U256::from(GWEI),
                    access_list,
                    ..DynamicFeeTx::default()
                }),
                9,
            ),
        ];

        for (tx, arity) in cases {
            let unsigned = encode_unsigned(&tx);
            let list = rlp::Rlp::new(&unsigned[1..]);
            assert_eq!(list.item_count().unwrap(), arity);
            assert_eq!(list.val_at::<u64>(0).unwrap(), 1);

            let access_list = list.at(arity - 1).unwrap();
            assert_eq!(access_list.item_count().unwrap(), 1);
            assert_eq!(access_list.at(0).unwrap().at(1).unwrap().item_count().unwrap(), 2);

            let signed = tx.sign(&key).unwrap();
            let encoded = encode_signed(&signed);
            let list = rlp::Rlp::new(&encoded[1..]);
            assert_eq!(list.item_count().unwrap(), arity + 3);

            assert_eq!(decode(&encoded).unwrap(), DecodedTransaction::Signed(signed));
        }
    }
}
