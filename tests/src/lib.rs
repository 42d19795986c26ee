//! # Quantum-Chain Transaction Codec Test Suite
//!
//! Unified test crate for `qc-18-transaction-codec`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmark bodies
//! │   └── qc_18_codec.rs
//! │
//! └── integration/      # Cross-layer flows
//!     ├── flows.rs      # generate → sign → decode through the service
//!     ├── oracles.rs    # Differential checks against secp256k1 and rlp
//!     └── properties.rs # proptest round trips
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # With codec logs
//! RUST_LOG=qc_18_transaction_codec=debug cargo test -p qc-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

pub mod benchmarks;
pub mod integration;
