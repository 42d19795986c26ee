//! # ECDSA Signing and Recovery (secp256k1)
//!
//! Deterministic signing of transaction hashes and signer recovery.
//!
//! ## Security Notes
//!
//! - **Deterministic Nonces**: RFC 6979, so the same key and hash always give
//!   the same `r, s`
//! - **Malleability Prevention (EIP-2)**: S must not exceed n/2; k256 signs
//!   with low S and recovery rejects anything above n/2
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: Uses `subtle` for scalar range checks
//! - **Key Hygiene**: key bytes pass through `Zeroizing` buffers and live in
//!   k256's `SigningKey`, which clears itself on drop
//!
//! ## `v` Encoding
//!
//! | Type | Replay-protected | v |
//! |------|------------------|---|
//! | Legacy | no | `27 + id` |
//! | Legacy | yes (EIP-155) | `chain_id * 2 + 35 + id` |
//! | EIP-2930 / EIP-1559 | always | `id` (yParity) |

use super::entities::{Address, Hash, SignedTransaction, Transaction, TxSignature, TxType};
use super::errors::{CodecError, CodecResult, SignatureError};
use super::hashing::address_from_pubkey;
use super::hexutil;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// floor(n / 2), the largest S accepted.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// `v` offset for legacy transactions without replay protection.
const LEGACY_V_OFFSET: u64 = 27;

/// `v` offset for EIP-155 replay-protected transactions.
const EIP155_V_OFFSET: u64 = 35;

/// Smallest EIP-155 `v`, chain id 1.
const MIN_EIP155_V: u64 = EIP155_V_OFFSET + 2;

// =============================================================================
// PRIVATE KEY
// =============================================================================

/// A secp256k1 private key, valid by construction.
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Parse a 32-byte big-endian scalar in `[1, n-1]`.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        // k256 left-pads short slices, so the width is checked here.
        if bytes.len() != 32 {
            return Err(CodecError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        SigningKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| CodecError::InvalidKey("scalar must be in [1, n-1]".into()))
    }

    /// Parse a `0x`-prefixed or bare hex private key.
    pub fn from_hex(raw: &str) -> CodecResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(hexutil::strip_prefix(raw))
                .map_err(|_| CodecError::InvalidKey("invalid hex".into()))?,
        );
        Self::from_bytes(&bytes)
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.0.verifying_key()
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Address {
        address_from_pubkey(self.verifying_key())
    }
}

impl From<SigningKey> for PrivateKey {
    fn from(key: SigningKey) -> Self {
        Self(key)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PrivateKey").field(&"<redacted>").finish()
    }
}

// =============================================================================
// SIGNING
// =============================================================================

/// Low-S signature with its public key recovery id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0 or 1
    pub recovery_id: u8,
}

/// Sign a 32-byte prehash with RFC 6979 nonces.
pub fn sign_prehash(hash: &Hash, key: &PrivateKey) -> Result<RecoverableSignature, SignatureError> {
    // k256 returns low-S signatures with the recovery id already adjusted.
    let (signature, recovery_id) = key
        .0
        .sign_prehash_recoverable(hash)
        .map_err(|_| SignatureError::SigningFailed)?;

    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    Ok(RecoverableSignature {
        r,
        s,
        recovery_id: recovery_id.to_byte(),
    })
}

/// Sign a transaction, consuming it into a [`SignedTransaction`].
pub fn sign_transaction(tx: Transaction, key: &PrivateKey) -> CodecResult<SignedTransaction> {
    let hash = tx.signing_hash();
    let signature = sign_prehash(&hash, key)?;
    let v = signature_v(&tx, signature.recovery_id)?;

    SignedTransaction::new(
        tx,
        TxSignature {
            r: signature.r,
            s: signature.s,
            v,
        },
    )
}

impl Transaction {
    /// Sign with `key`. See [`sign_transaction`].
    pub fn sign(self, key: &PrivateKey) -> CodecResult<SignedTransaction> {
        sign_transaction(self, key)
    }
}

// =============================================================================
// V ENCODING
// =============================================================================

/// Fold a recovery id into the `v` value for this transaction.
pub fn signature_v(tx: &Transaction, recovery_id: u8) -> CodecResult<u64> {
    if recovery_id > 1 {
        return Err(SignatureError::InvalidRecoveryId(recovery_id as u64).into());
    }
    let id = recovery_id as u64;

    match tx {
        Transaction::Legacy(legacy) => match legacy.replay_chain_id() {
            None => Ok(LEGACY_V_OFFSET + id),
            Some(chain_id) => chain_id
                .checked_mul(2)
                .and_then(|v| v.checked_add(EIP155_V_OFFSET + id))
                .ok_or_else(|| CodecError::field("chainId", "too large to encode into v")),
        },
        Transaction::AccessList(_) | Transaction::DynamicFee(_) => Ok(id),
    }
}

/// Extract the recovery id from `v`.
pub fn recovery_id_from_v(tx_type: TxType, v: u64) -> Result<u8, SignatureError> {
    match tx_type {
        TxType::Legacy => match v {
            27 | 28 => Ok((v - LEGACY_V_OFFSET) as u8),
            v if v >= MIN_EIP155_V => Ok(((v - EIP155_V_OFFSET) % 2) as u8),
            _ => Err(SignatureError::InvalidRecoveryId(v)),
        },
        TxType::AccessList | TxType::DynamicFee => match v {
            0 | 1 => Ok(v as u8),
            _ => Err(SignatureError::InvalidRecoveryId(v)),
        },
    }
}

/// Chain id implied by a signed legacy `v`: `None` for 27/28.
///
/// 35/36 would encode chain id 0, which is unprotected and signs with
/// 27/28, so those values are rejected.
pub fn legacy_chain_id_from_v(v: u64) -> Result<Option<u64>, SignatureError> {
    match v {
        27 | 28 => Ok(None),
        v if v >= MIN_EIP155_V => Ok(Some((v - EIP155_V_OFFSET) / 2)),
        _ => Err(SignatureError::InvalidRecoveryId(v)),
    }
}

/// Error for a `v` that does not belong to the transaction.
pub fn invalid_v(v: u64) -> CodecError {
    CodecError::SignatureError(SignatureError::InvalidRecoveryId(v))
}

// =============================================================================
// RECOVERY
// =============================================================================

/// Recover the signer of `hash` from an envelope signature.
pub fn recover_address(
    hash: &Hash,
    signature: &TxSignature,
    tx_type: TxType,
) -> CodecResult<Address> {
    let recovery_id = recovery_id_from_v(tx_type, signature.v)?;
    Ok(recover_address_with_id(
        hash,
        &signature.r,
        &signature.s,
        recovery_id,
    )?)
}

/// Recover the signer of `hash` from raw `r, s` and a recovery id.
///
/// Rejects zero or out-of-range scalars and high S before touching the
/// curve.
pub fn recover_address_with_id(
    hash: &Hash,
    r: &[u8; 32],
    s: &[u8; 32],
    recovery_id: u8,
) -> Result<Address, SignatureError> {
    if !is_valid_scalar(r) || !is_valid_scalar(s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(s) {
        return Err(SignatureError::MalleableSignature);
    }
    let recovery_id = RecoveryId::from_byte(recovery_id)
        .ok_or(SignatureError::InvalidRecoveryId(recovery_id as u64))?;

    let mut sig_bytes = Zeroizing::new([0u8; 64]);
    sig_bytes[..32].copy_from_slice(r);
    sig_bytes[32..].copy_from_slice(s);
    let signature =
        Signature::from_slice(&sig_bytes[..]).map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(hash, &signature, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

impl SignedTransaction {
    /// Address that produced this signature.
    pub fn recover_signer(&self) -> CodecResult<Address> {
        let hash = self.transaction().signing_hash();
        let signature = self.signature();
        Ok(recover_address_with_id(
            &hash,
            &signature.r,
            &signature.s,
            self.recovery_id(),
        )?)
    }
}

// =============================================================================
// SCALAR CHECKS
// =============================================================================

/// Constant-time big-endian comparison: returns `(a < b, a > b)`.
fn ct_compare(a: &[u8; 32], b: &[u8; 32]) -> (Choice, Choice) {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        less |= not_decided & Choice::from((a[i] < b[i]) as u8);
        greater |= not_decided & Choice::from((a[i] > b[i]) as u8);
    }

    (less, greater)
}

/// S <= floor(n/2) (EIP-2).
fn is_low_s(s: &[u8; 32]) -> bool {
    let (_, greater) = ct_compare(s, &SECP256K1_HALF_ORDER);
    (!greater).into()
}

/// Scalar in [1, n-1].
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let (less, _) = ct_compare(scalar, &SECP256K1_ORDER);
    (!is_zero & less).into()
}

// =============================================================================
// TEST HELPERS
// =============================================================================
