//! Benchmarks for this crate's [`SkipMap`].

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::{Rng, SeedableRng, rngs::StdRng};
use towerlist::SkipMap;

/// Benchmarking sizes.
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// Benchmarking insertion of fresh random keys.
#[inline]
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipMap Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut sm: SkipMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
                .take(size)
                .collect();

            b.iter(|| {
                sm.insert(rng.random(), rng.random());
            });
        });
    }
}

/// Benchmarking lookup of present keys.
#[inline]
pub fn find(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipMap Find");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let sm: SkipMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
                .take(size)
                .collect();
            let keys: Vec<u32> = sm.keys().copied().collect();
            let probes: Vec<u32> = std::iter::repeat_with(|| keys[rng.random_range(0..keys.len())])
                .take(10)
                .collect();

            b.iter(|| {
                for key in &probes {
                    black_box(sm.find(key).ok());
                }
            });
        });
    }
}

/// Benchmarking erasing a key and putting it back.
#[inline]
pub fn erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipMap Erase");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut sm: SkipMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
                .take(size)
                .collect();
            let keys: Vec<u32> = sm.keys().copied().collect();

            b.iter(|| {
                let key = keys[rng.random_range(0..keys.len())];
                if let Ok(value) = sm.erase(&key) {
                    sm.insert(key, value);
                }
            });
        });
    }
}

/// Benchmarking iteration.
#[inline]
pub fn iter(c: &mut Criterion) {
    c.bench_function("SkipMap Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let sm: SkipMap<u32, u32> = std::iter::repeat_with(|| (rng.random(), rng.random()))
            .take(100_000)
            .collect();

        b.iter(|| {
            for el in &sm {
                black_box(el);
            }
        });
    });
}
