//! Benchmarks for similar-app matching

#![allow(missing_docs)]

use appscout::matcher::{MatchOptions, SimilarityMatcher};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const WATCHED: [&str; 12] = [
    "whatsapp",
    "telegram",
    "signal",
    "messenger",
    "viber",
    "wechat",
    "line",
    "skype",
    "discord",
    "snapchat",
    "instagram",
    "threema",
];

/// A device-sized list of installed names, a few of them near watched names
fn installed_apps(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 50 {
            0 => "WhatsApp Business".to_string(),
            1 => "Telegrm".to_string(),
            _ => format!("Utility Application {i}"),
        })
        .collect()
}

fn bench_single_lookup(c: &mut Criterion) {
    let matcher = SimilarityMatcher::new(WATCHED, MatchOptions::default());

    c.bench_function("best_score_hit", |b| {
        b.iter(|| black_box(matcher.best_score(black_box("Telegrm"))));
    });
    c.bench_function("best_score_miss", |b| {
        b.iter(|| black_box(matcher.best_score(black_box("Calculator"))));
    });
}

fn bench_long_name(c: &mut Criterion) {
    let matcher = SimilarityMatcher::new(WATCHED, MatchOptions::default());
    let long_name = "Super Advanced Productivity Suite Professional Edition 2024";

    c.bench_function("best_score_chunked_pattern", |b| {
        b.iter(|| black_box(matcher.best_score(black_box(long_name))));
    });
}

fn bench_full_pass(c: &mut Criterion) {
    let matcher = SimilarityMatcher::new(WATCHED, MatchOptions::default());
    let mut group = c.benchmark_group("matches");

    for count in [50, 200, 1000] {
        let installed = installed_apps(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &installed, |b, installed| {
            b.iter(|| black_box(matcher.matches(installed)));
        });
    }
    group.finish();
}

fn bench_threshold_sweep(c: &mut Criterion) {
    let installed = installed_apps(200);
    let mut group = c.benchmark_group("threshold");

    for threshold in [0.0, 0.3, 0.6] {
        let matcher = SimilarityMatcher::new(WATCHED, MatchOptions::with_threshold(threshold));
        group.bench_with_input(
            BenchmarkId::from_parameter(threshold),
            &installed,
            |b, installed| {
                b.iter(|| black_box(matcher.matches(installed)));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_lookup,
    bench_long_name,
    bench_full_pass,
    bench_threshold_sweep
);
criterion_main!(benches);
