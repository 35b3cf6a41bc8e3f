//! Latency benchmarks for the detection path
//!
//! The synchronous pipeline is expected to stay in the low microseconds; the
//! registry fallback is benchmarked against the in-memory static registries
//! so only resolver overhead is measured.
//!
//! Run with: cargo bench -p carrierscope-detect

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::net::{IpAddr, Ipv4Addr};
use tokio::runtime::Runtime;

use carrierscope_detect::patterns::PatternMatcher;
use carrierscope_detect::{CarrierDetector, NetworkInterface, RawProviderRecord, WhoisResolver};

/// Benchmark the synchronous pipeline across each terminal stage
fn benchmark_pipeline(c: &mut Criterion) {
    let detector = CarrierDetector::new();

    let test_cases = vec![
        ("mnc_code", vec![RawProviderRecord::new("0").name("Verizon").codes("311", "480")]),
        ("carrier_name", vec![RawProviderRecord::new("0").name("T-Mobile")]),
        (
            "partial_name",
            vec![
                RawProviderRecord::new("0").name("Regional Co"),
                RawProviderRecord::new("1").name("Cricket Wireless"),
            ],
        ),
        ("interference", vec![RawProviderRecord::new("0").name("--").codes("65535", "65535")]),
        ("failed", vec![RawProviderRecord::new("0").name("Unknown Regional Co")]),
    ];

    let mut group = c.benchmark_group("Detection_Pipeline");
    group.sample_size(100);

    for (name, raw) in test_cases {
        group.bench_with_input(BenchmarkId::new("detect", name), &raw, |b, raw| {
            b.iter(|| detector.detect(black_box(raw), true));
        });
    }

    group.finish();
}

/// Benchmark the pattern matchers on short and long labels
fn benchmark_pattern_matcher(c: &mut Criterion) {
    let labels = vec![
        ("exact", "Verizon"),
        ("qualified", "AT&T Mobility"),
        ("legacy", "Cellco Partnership DBA Verizon Wireless"),
        ("miss", "Some Regional Telephone Cooperative of the Northern Plains"),
    ];

    let mut group = c.benchmark_group("Pattern_Matcher");

    for (name, label) in labels {
        group.bench_with_input(BenchmarkId::new("primary", name), &label, |b, label| {
            b.iter(|| PatternMatcher::primary().match_name(black_box(label)));
        });
        group.bench_with_input(BenchmarkId::new("expanded", name), &label, |b, label| {
            b.iter(|| PatternMatcher::expanded().match_name(black_box(label)));
        });
    }

    group.finish();
}

/// Benchmark the fallback against the static placeholder registries
fn benchmark_static_fallback(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let detector = CarrierDetector::new().with_resolver(WhoisResolver::standard());
    let raw = vec![RawProviderRecord::new("0").name("Unknown Regional Co")];

    let interfaces = vec![
        ("north_america", Ipv4Addr::new(12, 34, 56, 78)),
        ("asia_pacific", Ipv4Addr::new(49, 98, 1, 1)),
        ("unallocated", Ipv4Addr::new(203, 0, 113, 9)),
    ];

    let mut group = c.benchmark_group("Static_Fallback");

    for (name, address) in interfaces {
        let ifaces = vec![NetworkInterface::new("pdp_ip0", IpAddr::V4(address))];
        group.bench_with_input(BenchmarkId::new("detect_with_fallback", name), &ifaces, |b, ifaces| {
            b.iter(|| {
                rt.block_on(async {
                    detector
                        .detect_with_fallback(black_box(&raw), false, ifaces, None)
                        .await
                })
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_pipeline,
    benchmark_pattern_matcher,
    benchmark_static_fallback
);
criterion_main!(benches);
