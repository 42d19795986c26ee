//! # Quantum-Chain Codec Benchmarks
//!
//! Benchmark bodies driven by `benches/codec_benchmarks.rs`.
