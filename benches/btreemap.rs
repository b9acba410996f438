//! Benchmarks for the Standard Library's [`BTreeMap`].

use std::collections::BTreeMap;

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Benchmarking sizes.
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// Benchmarking insertion of fresh random keys.
#[inline]
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeMap Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut bm: BTreeMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
                .take(size)
                .collect();

            b.iter(|| {
                bm.insert(rng.random(), rng.random());
            });
        });
    }
}

/// Benchmarking lookup of present keys.
#[inline]
pub fn find(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeMap Find");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let bm: BTreeMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
                .take(size)
                .collect();
            let keys: Vec<u32> = bm.keys().copied().collect();
            let probes: Vec<u32> = std::iter::repeat_with(|| keys[rng.random_range(0..keys.len())])
                .take(10)
                .collect();

            b.iter(|| {
                for key in &probes {
                    black_box(bm.get(key));
                }
            });
        });
    }
}

/// Benchmarking removing a key and putting it back.
#[inline]
pub fn erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeMap Erase");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut bm: BTreeMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
                .take(size)
                .collect();
            let keys: Vec<u32> = bm.keys().copied().collect();

            b.iter(|| {
                let key = keys[rng.random_range(0..keys.len())];
                if let Some(value) = bm.remove(&key) {
                    bm.insert(key, value);
                }
            });
        });
    }
}

/// Benchmarking iteration.
#[inline]
pub fn iter(c: &mut Criterion) {
    c.bench_function("BTreeMap Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let bm: BTreeMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
            .take(100_000)
            .collect();

        b.iter(|| {
            for el in &bm {
                black_box(el);
            }
        });
    });
}
