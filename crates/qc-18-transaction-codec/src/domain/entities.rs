//! # Domain Entities
//!
//! Closed, per-type transaction records and the results handed across the
//! inbound port.
//!
//! ## Type-State
//!
//! ```text
//! [Transaction] ──sign──→ [SignedTransaction]
//!        ↑                        │
//!        └──────── into_parts ────┘
//! ```
//!
//! A [`Transaction`] never carries a signature. Signing consumes it and
//! returns a [`SignedTransaction`], whose `v` is checked against the
//! transaction type when it is constructed.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::ecdsa;
use super::errors::{CodecError, CodecResult};

/// 20-byte account address.
pub type Address = [u8; 20];

/// 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// 32-byte storage slot key.
pub type StorageKey = [u8; 32];

/// Wei per gwei.
pub const GWEI: u64 = 1_000_000_000;

// =============================================================================
// Transaction Type
// =============================================================================

/// Envelope type discriminator (EIP-2718).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TxType {
    /// Untyped envelope with a single gas price.
    Legacy = 0,
    /// EIP-2930 access list transaction.
    AccessList = 1,
    /// EIP-1559 fee market transaction.
    DynamicFee = 2,
}

impl TxType {
    /// Numeric discriminator.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            TxType::Legacy => "Legacy",
            TxType::AccessList => "EIP-2930 (Access List)",
            TxType::DynamicFee => "EIP-1559",
        }
    }
}

impl TryFrom<u64> for TxType {
    type Error = CodecError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TxType::Legacy),
            1 => Ok(TxType::AccessList),
            2 => Ok(TxType::DynamicFee),
            other => Err(CodecError::InvalidType(other)),
        }
    }
}

impl TryFrom<u8> for TxType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TxType::try_from(value as u64)
    }
}

impl From<TxType> for u8 {
    fn from(tx_type: TxType) -> Self {
        tx_type.as_u8()
    }
}

impl std::fmt::Display for TxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.as_u8(), self.name())
    }
}

// =============================================================================
// Per-Type Records
// =============================================================================

/// Storage slots a transaction declares it will touch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<StorageKey>,
}

/// Legacy (type 0) transaction.
///
/// `chain_id` is `Some` only when the transaction is replay-protected
/// (EIP-155); it is then folded into the signing payload and into `v`.
/// Chain id 0 carries no replay protection, so `Some(0)` behaves like `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTx {
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
}

impl LegacyTx {
    /// EIP-155 chain id, with `Some(0)` folded into `None`.
    pub fn replay_chain_id(&self) -> Option<u64> {
        self.chain_id.filter(|&chain_id| chain_id != 0)
    }
}

/// EIP-2930 (type 1) transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: Vec<AccessListItem>,
}

/// EIP-1559 (type 2) transaction.
///
/// `max_fee_per_gas >= max_priority_fee_per_gas` is expected but not
/// enforced by the encoder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFeeTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: Vec<AccessListItem>,
}

/// An unsigned transaction of one of the three supported types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Legacy(LegacyTx),
    AccessList(AccessListTx),
    DynamicFee(DynamicFeeTx),
}

impl Transaction {
    pub fn tx_type(&self) -> TxType {
        match self {
            Transaction::Legacy(_) => TxType::Legacy,
            Transaction::AccessList(_) => TxType::AccessList,
            Transaction::DynamicFee(_) => TxType::DynamicFee,
        }
    }

    /// Chain id, `None` for legacy transactions without replay protection.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Transaction::Legacy(tx) => tx.replay_chain_id(),
            Transaction::AccessList(tx) => Some(tx.chain_id),
            Transaction::DynamicFee(tx) => Some(tx.chain_id),
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.nonce,
            Transaction::AccessList(tx) => tx.nonce,
            Transaction::DynamicFee(tx) => tx.nonce,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.gas_limit,
            Transaction::AccessList(tx) => tx.gas_limit,
            Transaction::DynamicFee(tx) => tx.gas_limit,
        }
    }

    /// Recipient, `None` for contract creation.
    pub fn to(&self) -> Option<&Address> {
        match self {
            Transaction::Legacy(tx) => tx.to.as_ref(),
            Transaction::AccessList(tx) => tx.to.as_ref(),
            Transaction::DynamicFee(tx) => tx.to.as_ref(),
        }
    }

    pub fn value(&self) -> &U256 {
        match self {
            Transaction::Legacy(tx) => &tx.value,
            Transaction::AccessList(tx) => &tx.value,
            Transaction::DynamicFee(tx) => &tx.value,
        }
    }

    pub fn data(&self) -> &[u8] {
        match self {
            Transaction::Legacy(tx) => &tx.data,
            Transaction::AccessList(tx) => &tx.data,
            Transaction::DynamicFee(tx) => &tx.data,
        }
    }

    /// Gas price for types 0 and 1.
    pub fn gas_price(&self) -> Option<&U256> {
        match self {
            Transaction::Legacy(tx) => Some(&tx.gas_price),
            Transaction::AccessList(tx) => Some(&tx.gas_price),
            Transaction::DynamicFee(_) => None,
        }
    }

    /// Fee cap for type 2.
    pub fn max_fee_per_gas(&self) -> Option<&U256> {
        match self {
            Transaction::DynamicFee(tx) => Some(&tx.max_fee_per_gas),
            _ => None,
        }
    }

    /// Priority fee cap for type 2.
    pub fn max_priority_fee_per_gas(&self) -> Option<&U256> {
        match self {
            Transaction::DynamicFee(tx) => Some(&tx.max_priority_fee_per_gas),
            _ => None,
        }
    }

    /// Access list for types 1 and 2 (possibly empty), `None` for legacy.
    pub fn access_list(&self) -> Option<&[AccessListItem]> {
        match self {
            Transaction::Legacy(_) => None,
            Transaction::AccessList(tx) => Some(&tx.access_list),
            Transaction::DynamicFee(tx) => Some(&tx.access_list),
        }
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }
}

impl From<LegacyTx> for Transaction {
    fn from(tx: LegacyTx) -> Self {
        Transaction::Legacy(tx)
    }
}

impl From<AccessListTx> for Transaction {
    fn from(tx: AccessListTx) -> Self {
        Transaction::AccessList(tx)
    }
}

impl From<DynamicFeeTx> for Transaction {
    fn from(tx: DynamicFeeTx) -> Self {
        Transaction::DynamicFee(tx)
    }
}

// =============================================================================
// Signatures
// =============================================================================

/// ECDSA signature as carried by an envelope.
///
/// `v` is `27 + id` or `chain_id * 2 + 35 + id` for legacy transactions and
/// the bare recovery id (`yParity`) for typed ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u64,
}

/// A transaction together with a signature whose `v` matches its type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    transaction: Transaction,
    signature: TxSignature,
    #[serde(skip)]
    recovery_id: u8,
}

impl SignedTransaction {
    /// Attach a signature, checking that `v` is valid for the transaction.
    ///
    /// Legacy `v` must agree with the transaction's replay protection:
    /// 27/28 without a chain id, `chain_id * 2 + 35/36` with one.
    pub fn new(transaction: Transaction, signature: TxSignature) -> CodecResult<Self> {
        let recovery_id = ecdsa::recovery_id_from_v(transaction.tx_type(), signature.v)?;
        let expected_v = ecdsa::signature_v(&transaction, recovery_id)?;
        if expected_v != signature.v {
            return Err(ecdsa::invalid_v(signature.v));
        }

        Ok(Self {
            transaction,
            signature,
            recovery_id,
        })
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn signature(&self) -> &TxSignature {
        &self.signature
    }

    pub fn tx_type(&self) -> TxType {
        self.transaction.tx_type()
    }

    /// Recovery id (0 or 1) folded into `v`.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    pub fn into_parts(self) -> (Transaction, TxSignature) {
        (self.transaction, self.signature)
    }
}

/// Result of decoding an envelope: signature present or not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DecodedTransaction {
    Unsigned(Transaction),
    Signed(SignedTransaction),
}

impl DecodedTransaction {
    pub fn transaction(&self) -> &Transaction {
        match self {
            DecodedTransaction::Unsigned(tx) => tx,
            DecodedTransaction::Signed(signed) => signed.transaction(),
        }
    }

    pub fn signature(&self) -> Option<&TxSignature> {
        match self {
            DecodedTransaction::Unsigned(_) => None,
            DecodedTransaction::Signed(signed) => Some(signed.signature()),
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, DecodedTransaction::Signed(_))
    }

    /// Drop any signature and return the bare transaction.
    pub fn into_transaction(self) -> Transaction {
        match self {
            DecodedTransaction::Unsigned(tx) => tx,
            DecodedTransaction::Signed(signed) => signed.into_parts().0,
        }
    }
}

// =============================================================================
// Port Results
// =============================================================================

/// Output of the decode boundary.
#[derive(Clone, Debug, Serialize)]
pub struct DecodedReport {
    pub transaction: DecodedTransaction,
    /// Input normalized to a `0x`-prefixed string.
    pub raw_hex: String,
    pub signing_hash: Hash,
    /// Final hash, present only when the envelope is signed.
    pub hash: Option<Hash>,
    /// Recovered signer, present only when the envelope is signed.
    pub sender: Option<Address>,
    /// SHA-256 of `raw_hex`; diagnostic only.
    pub integrity_digest: String,
}

/// Output of the generate boundary.
#[derive(Clone, Debug, Serialize)]
pub struct UnsignedEnvelope {
    pub transaction: Transaction,
    pub raw_hex: String,
    pub signing_hash: Hash,
    pub integrity_digest: String,
}

/// Output of the sign boundary.
#[derive(Clone, Debug, Serialize)]
pub struct SignedEnvelope {
    pub transaction: SignedTransaction,
    pub raw_hex: String,
    pub hash: Hash,
    pub signer: Address,
    pub signature: TxSignature,
}
