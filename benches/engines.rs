//! Engine benchmarks
//!
//! - `reference_vs_gotoh`: O(M²·N) oracle against the O(M·N) fill on short reads
//! - `gap_models`: uniform vs homopolymer-aware local alignment
//! - `seed_extension`: chunked extension through long sequences

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gotoh_aligner::{Aligner, GapModelKind, ReferenceAligner, ScoreParams, Seed, SeedExtender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random DNA with homopolymer runs of up to `max_run` bases.
fn generate_sequence(rng: &mut StdRng, len: usize, max_run: usize) -> Vec<u8> {
    let bases = b"ACGT";
    let mut sequence = Vec::with_capacity(len);
    while sequence.len() < len {
        let base = bases[rng.gen_range(0..4)];
        let run = rng.gen_range(1..=max_run).min(len - sequence.len());
        sequence.extend(std::iter::repeat(base).take(run));
    }
    sequence
}

/// Copy of `sequence` with roughly `rate` of its positions substituted or dropped.
fn mutate(rng: &mut StdRng, sequence: &[u8], rate: f64) -> Vec<u8> {
    let mut mutated = Vec::with_capacity(sequence.len());
    for &base in sequence {
        if rng.gen_bool(rate) {
            if rng.gen_bool(0.5) {
                mutated.push(b"ACGT"[rng.gen_range(0..4)]);
            }
        } else {
            mutated.push(base);
        }
    }
    if mutated.is_empty() {
        mutated.push(b'A');
    }
    mutated
}

fn bench_reference_vs_gotoh(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_vs_gotoh");
    let mut rng = StdRng::seed_from_u64(7);
    let scoring = ScoreParams::default();

    for len in [32, 64, 128] {
        let database = generate_sequence(&mut rng, len, 1);
        let query = mutate(&mut rng, &database, 0.1);

        group.throughput(Throughput::Elements((len * query.len()) as u64));
        group.bench_with_input(BenchmarkId::new("reference", len), &len, |b, _| {
            let aligner = ReferenceAligner::new(scoring);
            b.iter(|| black_box(aligner.align(black_box(&database), black_box(&query))))
        });
        group.bench_with_input(BenchmarkId::new("gotoh", len), &len, |b, _| {
            let aligner = Aligner::new(scoring);
            b.iter(|| black_box(aligner.align(black_box(&database), black_box(&query))))
        });
    }

    group.finish();
}

fn bench_gap_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("gap_models");
    let mut rng = StdRng::seed_from_u64(11);
    let scoring = ScoreParams::new(2.0, -3.0, 5.0, 2.0).unwrap();

    for len in [256, 1024] {
        let database = generate_sequence(&mut rng, len, 6);
        let query = mutate(&mut rng, &database, 0.05);

        for gap_model in [GapModelKind::Uniform, GapModelKind::Homopolymer] {
            let aligner = Aligner::new(scoring).with_gap_model(gap_model);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", gap_model), len),
                &len,
                |b, _| b.iter(|| black_box(aligner.align(black_box(&database), black_box(&query)))),
            );
        }
    }

    group.finish();
}

fn bench_seed_extension(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_extension");
    group.sample_size(20);
    let mut rng = StdRng::seed_from_u64(13);
    let database = generate_sequence(&mut rng, 8192, 4);
    let query = database.clone();
    let seed = Seed::new(4096, 4096, 16);

    for chunk_size in [64, 256] {
        let extender = SeedExtender::new(ScoreParams::default())
            .with_chunk_size(chunk_size)
            .with_overlap(16);
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, _| b.iter(|| black_box(extender.extend(&database, &query, seed))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reference_vs_gotoh,
    bench_gap_models,
    bench_seed_extension
);
criterion_main!(benches);
