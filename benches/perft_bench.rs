//! Benchmarks for move generation and perft throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_position::{
    movegen::{get_moves, ALL},
    perft::{perft, perft_cached, perft_parallel, PerftCache},
    Position,
};

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let startpos = Position::new();
    for depth in 1..=5 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| perft(black_box(&startpos), black_box(depth)))
        });
    }

    let kiwipete =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft(black_box(&kiwipete), black_box(depth)))
        });
    }

    group.finish();
}

fn bench_perft_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft_parallel");
    group.sample_size(10);

    let kiwipete =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    for depth in 4..=5 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft_parallel(black_box(&kiwipete), black_box(depth)))
        });
    }

    group.finish();
}

fn bench_perft_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft_cached");

    let startpos = Position::new();
    group.bench_function("startpos_depth5_cold", |b| {
        b.iter(|| {
            let mut cache = PerftCache::new();
            perft_cached(black_box(&startpos), 5, &mut cache)
        })
    });

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let startpos = Position::new();
    group.bench_function("startpos", |b| b.iter(|| black_box(get_moves::<ALL>(&startpos))));

    let middlegame =
        Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
            .unwrap();
    group.bench_function("middlegame", |b| {
        b.iter(|| black_box(get_moves::<ALL>(&middlegame)))
    });

    let kiwipete =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    group.bench_function("kiwipete", |b| b.iter(|| black_box(get_moves::<ALL>(&kiwipete))));

    group.finish();
}

criterion_group!(
    benches,
    bench_perft,
    bench_perft_parallel,
    bench_perft_cached,
    bench_movegen
);
criterion_main!(benches);
