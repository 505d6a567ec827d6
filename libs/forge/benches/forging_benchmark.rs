//! Performance benchmarks for tzforge
//!
//! Covers the hot paths of an offline signing workflow:
//! - Forging single operations and batches
//! - Signing per curve
//! - Script expression hashing
//! - Encrypted secret import (dominated by the key derivation rounds)

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tzforge::test_utils::{self, BRANCH, ENCRYPTED_SECRET, ENCRYPTED_SECRET_PASSWORD};
use tzforge::{Key, expression, forge};

/// Benchmark forging batches of increasing size
fn bench_forging(c: &mut Criterion) {
    let mut group = c.benchmark_group("Forging");

    let single = [test_utils::transaction()];
    group.bench_function("transaction", |b| {
        b.iter(|| forge::forge(black_box(BRANCH), black_box(&single)).unwrap());
    });

    let call = [test_utils::contract_call()];
    group.bench_function("contract call", |b| {
        b.iter(|| forge::forge(black_box(BRANCH), black_box(&call)).unwrap());
    });

    let origination = [test_utils::origination()];
    group.bench_function("origination", |b| {
        b.iter(|| forge::forge(black_box(BRANCH), black_box(&origination)).unwrap());
    });

    for size in &[1, 10, 50, 200] {
        let contents: Vec<_> = (0..*size).map(|_| test_utils::transaction()).collect();
        group.bench_with_input(BenchmarkId::new("batch", size), size, |b, _| {
            b.iter(|| forge::forge(black_box(BRANCH), black_box(&contents)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark signing a forged transaction on each curve
fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Signing");

    let forged = forge::forge(BRANCH, &test_utils::batch()).unwrap();
    for key in test_utils::keys() {
        group.bench_with_input(
            BenchmarkId::new("sign", key.curve()),
            &key,
            |b, key| {
                b.iter(|| forged.sign(black_box(key)).unwrap());
            },
        );
    }

    for key in test_utils::keys() {
        let signature = key.sign_bytes(forged.as_bytes()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("verify", key.curve()),
            &key,
            |b, key| {
                b.iter(|| key.verify(black_box(forged.as_bytes()), black_box(&signature)));
            },
        );
    }

    group.finish();
}

/// Benchmark expression hashing
fn bench_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Expressions");

    group.bench_function("int", |b| {
        b.iter(|| expression::int_expression(black_box(123_456_789)));
    });
    group.bench_function("address", |b| {
        b.iter(|| expression::address_expression(black_box(test_utils::SOURCE)).unwrap());
    });
    group.bench_function("michelson pair", |b| {
        b.iter(|| {
            expression::michelson_expression(black_box(
                r#"{"prim":"Pair","args":[{"string":"tz1XJ1UNechmHKhQo4tvVX6qztnVuQuSFKgd"},{"int":"42"}]}"#,
            ))
            .unwrap()
        });
    });

    group.finish();
}

/// Benchmark encrypted secret import
fn bench_key_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("Key Import");
    group.sample_size(10);

    group.bench_function("encrypted secret", |b| {
        b.iter(|| {
            Key::from_encrypted_secret(black_box(ENCRYPTED_SECRET), ENCRYPTED_SECRET_PASSWORD)
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_forging,
    bench_signing,
    bench_expressions,
    bench_key_import
);
criterion_main!(benches);
