//! # Integration Tests
//!
//! Exercises the codec through its public API only.
//!
//! Set `RUST_LOG` to see the service's `tracing` output.

pub mod oracles;
pub mod properties;

use std::sync::Once;

use qc_18_transaction_codec::{FieldMap, PrivateKey};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test subscriber once, only when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var_os("RUST_LOG").is_some() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }
    });
}

/// Well-known test key `0x…01`.
pub const KEY_ONE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

/// Checksummed address of [`KEY_ONE`].
pub const KEY_ONE_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

/// Recipient used across fixtures.
pub const RECIPIENT: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

/// Random key as `0x` hex together with its parsed form, retrying on the
/// negligible chance of an out-of-range scalar.
pub fn random_key() -> (String, PrivateKey) {
    loop {
        let hex_key = format!("0x{}", hex::encode(rand::random::<[u8; 32]>()));
        if let Ok(key) = PrivateKey::from_hex(&hex_key) {
            return (hex_key, key);
        }
    }
}

/// Build a field map from a JSON object literal.
pub fn fields(value: serde_json::Value) -> FieldMap {
    serde_json::from_value(value).expect("field map must be a JSON object")
}
