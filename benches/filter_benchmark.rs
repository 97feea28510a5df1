//! Benchmarks for the mock filter language and history search.
//!
//! These benchmarks measure filter parsing, filter evaluation over datasets
//! of various sizes, and free-text history search, so interactive filtering
//! stays comfortably below perceptible latency.

use api_workbench::history::{search_history, HistoryEntry, HistoryLog};
use api_workbench::mock::{parse_filter, seed_records, MockRecord};
use api_workbench::models::{ApiRequest, ApiResponse, HttpMethod};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Builds the parameter map for a representative multi-condition filter.
fn complex_params() -> HashMap<String, Value> {
    let mut params = HashMap::new();
    params.insert(
        "status".to_string(),
        json!({"operator": "equals", "value": "active"}),
    );
    params.insert(
        "value".to_string(),
        json!({"operator": "between", "value": "100,800"}),
    );
    params.insert(
        "name".to_string(),
        json!({"operator": "startsWith", "value": "Item"}),
    );
    params
}

/// Builds a history log with `count` plausible entries.
fn populated_log(count: usize) -> HistoryLog {
    let mut log = HistoryLog::with_settings(count, false);
    for i in 0..count {
        let method = match i % 4 {
            0 => HttpMethod::GET,
            1 => HttpMethod::POST,
            2 => HttpMethod::PUT,
            _ => HttpMethod::DELETE,
        };
        let mut request = ApiRequest::new(
            format!("profile-{}", i % 3),
            method,
            format!("https://api.example.com/v1/resource/{}", i),
        );
        request.add_header("Accept".to_string(), "application/json".to_string());

        let status = if i % 10 == 0 { 500 } else { 200 };
        let response = ApiResponse::new(
            status,
            if status == 200 { "OK" } else { "Internal Server Error" },
            HashMap::new(),
            json!({"index": i}),
        );
        log.record(HistoryEntry::new(request, response));
    }
    log
}

fn bench_filter_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_parsing");

    let mut single = HashMap::new();
    single.insert(
        "status".to_string(),
        json!({"operator": "equals", "value": "active"}),
    );
    group.bench_function("single_condition", |b| {
        b.iter(|| parse_filter(black_box(&single)).unwrap())
    });

    let complex = complex_params();
    group.bench_function("three_conditions", |b| {
        b.iter(|| parse_filter(black_box(&complex)).unwrap())
    });

    group.finish();
}

fn bench_filter_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_evaluation");
    let filter = parse_filter(&complex_params()).unwrap();

    for size in [50, 500, 5_000] {
        let records = seed_records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let matched: Vec<&MockRecord> = records
                    .iter()
                    .filter(|record| filter.matches(|field| record.field_view(field)))
                    .collect();
                black_box(matched)
            })
        });
    }

    group.finish();
}

fn bench_history_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_search");

    for size in [100, 1_000] {
        let log = populated_log(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| black_box(search_history(black_box("resource/7"), log)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_filter_parsing,
    bench_filter_evaluation,
    bench_history_search
);
criterion_main!(benches);
