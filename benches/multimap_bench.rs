use chained_multimap::ChainedMultimap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("multimap_insert_10k_dup_heavy", |b| {
        b.iter_batched(
            ChainedMultimap::<String, u64>::new,
            |mut m| {
                // ~10 entries per distinct key
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(key(x % 1_000), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_all_walk(c: &mut Criterion) {
    c.bench_function("multimap_get_all_walk", |b| {
        let mut m = ChainedMultimap::<String, u64>::new();
        for (i, x) in lcg(7).take(10_000).enumerate() {
            m.insert(key(x % 1_000), i as u64);
        }
        let keys: Vec<_> = (0..1_000u64).map(key).collect();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            let sum: u64 = m.get_all(k.as_str()).map(|(_, v)| *v).sum();
            black_box(sum)
        })
    });
}

fn bench_count(c: &mut Criterion) {
    c.bench_function("multimap_count", |b| {
        let mut m = ChainedMultimap::<String, u64>::new();
        for (i, x) in lcg(9).take(10_000).enumerate() {
            m.insert(key(x % 1_000), i as u64);
        }
        let keys: Vec<_> = (0..1_000u64).map(key).collect();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.count(k.as_str()))
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("multimap_get_miss", |b| {
        let mut m = ChainedMultimap::<String, u64>::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.insert(key(x % 1_000), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = format!("m{:016x}", miss.next().unwrap());
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_remove_groups(c: &mut Criterion) {
    c.bench_function("multimap_remove_1k_groups", |b| {
        b.iter_batched(
            || {
                let mut m = ChainedMultimap::<String, u64>::new();
                for (i, x) in lcg(13).take(8_000).enumerate() {
                    m.insert(key(x % 1_000), i as u64);
                }
                m
            },
            |mut m| {
                for n in 0..1_000u64 {
                    black_box(m.remove(key(n).as_str()));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter(c: &mut Criterion) {
    c.bench_function("multimap_iter_10k", |b| {
        let mut m = ChainedMultimap::<String, u64>::new();
        for (i, x) in lcg(17).take(10_000).enumerate() {
            m.insert(key(x % 1_000), i as u64);
        }
        b.iter(|| {
            let sum: u64 = m.iter().map(|(_, v)| *v).sum();
            black_box(sum)
        })
    });
}

fn bench_drain(c: &mut Criterion) {
    c.bench_function("multimap_drain_10k", |b| {
        b.iter_batched(
            || {
                let mut m = ChainedMultimap::<String, u64>::new();
                for (i, x) in lcg(19).take(10_000).enumerate() {
                    m.insert(key(x % 1_000), i as u64);
                }
                m
            },
            |mut m| {
                black_box(m.drain().count());
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_all_walk, bench_count, bench_get_miss,
        bench_remove_groups, bench_iter, bench_drain
}
criterion_main!(benches);
