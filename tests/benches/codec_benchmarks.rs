//! # Transaction Codec Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Encode (unsigned / signed) | < 10μs |
//! | Decode 4 KiB calldata | < 50μs |
//! | Sign (RFC 6979) | < 1ms |
//! | Recover signer | < 1ms |

use criterion::{criterion_group, criterion_main};
use qc_tests::benchmarks::qc_18_codec::{
    bench_decode, bench_encode, bench_service_flow, bench_sign_and_recover,
};

criterion_group!(
    codec_benches,
    bench_encode,
    bench_decode,
    bench_sign_and_recover,
    bench_service_flow
);
criterion_main!(codec_benches);
