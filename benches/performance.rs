//! Performance benchmarks for dping
//!
//! Covers the CPU-bound pieces of a run: probe output parsing, catalog
//! loading, ranking, snapshot encoding and report rendering.

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dping::{
    cli::Cli,
    config::ConfigParser,
    models::{AddressRecord, DomainRecord, Measurement},
    output::OutputFormatterFactory,
    probe::parse_ping_output,
    Catalog, ReachFilter,
};
use std::hint::black_box;

const LINUX_OUTPUT: &str = "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.

--- 1.1.1.1 ping statistics ---
20 packets transmitted, 19 received, 5% packet loss, time 19026ms
rtt min/avg/max/mdev = 9.812/10.448/12.031/0.511 ms
";

const BSD_OUTPUT: &str = "PING 1.1.1.1 (1.1.1.1): 56 data bytes

--- 1.1.1.1 ping statistics ---
20 packets transmitted, 20 packets received, 0.0% packet loss
round-trip min/avg/max/stddev = 9.812/10.448/12.031/0.511 ms
";

const LOST_OUTPUT: &str = "--- 2.2.2.2 ping statistics ---
20 packets transmitted, 0 received, 100% packet loss, time 19456ms
";

/// Build a catalog of `domains` domains with `per_domain` measured addresses each
fn create_sample_catalog(domains: usize, per_domain: usize) -> Catalog {
    let domains = (0..domains)
        .map(|d| {
            let addresses = (0..per_domain)
                .map(|a| {
                    let measurement = if (d + a) % 7 == 0 {
                        Measurement::unreachable()
                    } else {
                        Measurement::new(5.0 + ((d * 31 + a * 17) % 300) as f64, ((d + a) % 5) as f64 * 10.0)
                    };
                    AddressRecord::with_measurement(format!("10.{}.{}.{}", d / 256, d % 256, a), measurement)
                })
                .collect();
            DomainRecord::with_addresses(format!("domain-{}.example", d), addresses)
        })
        .collect();
    Catalog::from_domains(domains)
}

/// Build source catalog text in the `{group: {domain: [address]}}` shape
fn create_source_text(domains: usize, per_domain: usize) -> String {
    let mut group = serde_json::Map::new();
    for d in 0..domains {
        let addresses: Vec<serde_json::Value> = (0..per_domain)
            .map(|a| serde_json::Value::String(format!("10.{}.{}.{}", d / 256, d % 256, a)))
            .collect();
        group.insert(format!("domain-{}.example", d), serde_json::Value::Array(addresses));
    }
    let mut root = serde_json::Map::new();
    root.insert("bench".to_string(), serde_json::Value::Object(group));
    serde_json::Value::Object(root).to_string()
}

/// Benchmark probe output parsing
fn benchmark_probe_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe_parsing");

    for (name, output) in [("linux", LINUX_OUTPUT), ("bsd", BSD_OUTPUT), ("all_lost", LOST_OUTPUT)] {
        group.bench_with_input(BenchmarkId::new("parse_ping_output", name), output, |b, output| {
            b.iter(|| black_box(parse_ping_output(black_box(output))))
        });
    }

    group.bench_function("parse_garbage", |b| {
        b.iter(|| black_box(parse_ping_output(black_box("ping: unknown host"))))
    });

    group.finish();
}

/// Benchmark ranking at several catalog sizes
fn benchmark_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    for size in [10usize, 100, 1000].iter() {
        let catalog = create_sample_catalog(*size, 16);
        group.bench_with_input(BenchmarkId::new("rank_all", size), size, |b, _| {
            b.iter_batched(
                || catalog.clone(),
                |mut catalog| {
                    catalog.rank_all();
                    black_box(catalog)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark catalog and snapshot (de)serialization
fn benchmark_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistence");

    let source = create_source_text(500, 8);
    group.bench_function("parse_source", |b| {
        b.iter(|| black_box(Catalog::from_source_str(black_box(&source))))
    });

    let catalog = create_sample_catalog(500, 8);
    group.bench_function("encode_snapshot", |b| b.iter(|| black_box(catalog.to_snapshot_string())));

    if let Ok(snapshot) = catalog.to_snapshot_string() {
        group.bench_function("decode_snapshot", |b| {
            b.iter(|| black_box(Catalog::from_snapshot_str(black_box(&snapshot))))
        });
    }

    group.finish();
}

/// Benchmark report rendering with and without color
fn benchmark_report_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_rendering");

    let mut catalog = create_sample_catalog(200, 8);
    catalog.rank_all();

    let plain = OutputFormatterFactory::create_plain_formatter();
    let colored = OutputFormatterFactory::create_formatter(true);

    for filter in [ReachFilter::Reachable, ReachFilter::Unreachable] {
        group.bench_with_input(BenchmarkId::new("plain", filter.signature()), &filter, |b, filter| {
            b.iter(|| black_box(catalog.report(*filter, plain.as_ref())))
        });
        group.bench_with_input(BenchmarkId::new("colored", filter.signature()), &filter, |b, filter| {
            b.iter(|| black_box(catalog.report(*filter, colored.as_ref())))
        });
    }

    group.finish();
}

/// Benchmark configuration parsing from command line arguments
fn benchmark_config_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_parsing");

    let args = ["dping", "ping", "--dns", "vpn.json", "--opt", "-I tun0", "-j", "32", "-c", "5"];

    group.bench_function("parse_cli_args", |b| {
        b.iter(|| black_box(Cli::try_parse_from(black_box(args))))
    });

    group.bench_function("build_config", |b| {
        b.iter(|| {
            let cli = Cli::parse_from(args);
            black_box(ConfigParser::new(cli).parse_with_lookup(|_| None))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_probe_parsing,
    benchmark_ranking,
    benchmark_persistence,
    benchmark_report_rendering,
    benchmark_config_parsing
);
criterion_main!(benches);
