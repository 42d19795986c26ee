//! # Domain Layer
//!
//! Pure encoding, hashing and signing logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod config;
pub mod ecdsa;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod hashing;
pub mod hexutil;
pub mod rlp;
pub mod validation;
