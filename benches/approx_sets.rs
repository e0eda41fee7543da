#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use approx_sets::bloom::BloomFilter;
use approx_sets::estimator::CardinalityEstimator;
use approx_sets::hash::{DoubleHashing, HashFamily, SaltedSha256, SeededWyHash, DEFAULT_SEED};
use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};

/// Operations are benchmarked against item counts ranging from 0 to `DEFAULT_MAX_ITEMS`
/// or environment variable `N` (if defined), doubled with every iteration as [0, 1, 2, ..., N].
const DEFAULT_MAX_ITEMS: usize = 4096;

/// Target false positive rate used to size filters for a given item count.
const FPP: f64 = 0.01;

/// Number of absent items probed when measuring observed false positive rate.
const PROBES: usize = 10_000;

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Protobuf));
    targets = benchmark
}
criterion_main!(benches);

fn benchmark(c: &mut Criterion) {
    let bench_results_path = std::env::var("BENCH_RESULTS_PATH")
        .unwrap_or_else(|_| format!("{}/target", env!("CARGO_MANIFEST_DIR")));
    let max_items = std::env::var("N")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_ITEMS);

    let counts: Vec<usize> = std::iter::once(0)
        .chain((0..).map(|c| 1 << c))
        .take_while(|&c| c <= max_items)
        .collect();

    let mut group = c.benchmark_group("bloom_insert");
    for &n in &counts {
        group.throughput(Throughput::Elements(n.max(1) as u64));
        bench_insert::<Bloom<SeededWyHash>>(&mut group, n);
        bench_insert::<Bloom<DoubleHashing>>(&mut group, n);
        bench_insert::<Bloom<SaltedSha256>>(&mut group, n);
        bench_insert::<ProbabilisticBloom>(&mut group, n);
    }
    group.finish();

    let mut group = c.benchmark_group("bloom_contains");
    group.throughput(Throughput::Elements(1));
    for &n in &counts {
        bench_contains::<Bloom<SeededWyHash>>(&mut group, n);
        bench_contains::<Bloom<DoubleHashing>>(&mut group, n);
        bench_contains::<Bloom<SaltedSha256>>(&mut group, n);
        bench_contains::<ProbabilisticBloom>(&mut group, n);
    }
    group.finish();

    let mut group = c.benchmark_group("hll_update");
    for &n in &counts {
        group.throughput(Throughput::Elements(n.max(1) as u64));
        bench_update::<Estimator>(&mut group, n);
        bench_update::<ProbabilisticHyperLogLog>(&mut group, n);
    }
    group.finish();

    let mut group = c.benchmark_group("hll_estimate");
    group.throughput(Throughput::Elements(1));
    for &n in &counts {
        bench_estimate::<Estimator>(&mut group, n);
        bench_estimate::<ProbabilisticHyperLogLog>(&mut group, n);
    }
    group.finish();

    let table_config = Settings::default().with(Style::markdown());

    let results: Vec<FilterRecord> = counts
        .iter()
        .map(|&n| FilterRecord {
            items: n,
            wyhash: measure_fpp::<Bloom<SeededWyHash>>(n),
            double_hashing: measure_fpp::<Bloom<DoubleHashing>>(n),
            sha256: measure_fpp::<Bloom<SaltedSha256>>(n),
            probabilistic_collections: measure_fpp::<ProbabilisticBloom>(n),
        })
        .collect();
    std::fs::write(
        format!("{}/false_positive_rate.md", bench_results_path),
        Table::new(results).with(table_config.clone()).to_string(),
    )
    .unwrap();

    let results: Vec<EstimatorRecord> = counts
        .iter()
        .map(|&n| EstimatorRecord {
            cardinality: n,
            approx_sets: measure_allocations::<Estimator>(n),
            probabilistic_collections: measure_allocations::<ProbabilisticHyperLogLog>(n),
        })
        .collect();
    std::fs::write(
        format!("{}/memory_usage.md", bench_results_path),
        Table::new(results).with(table_config.clone()).to_string(),
    )
    .unwrap();

    let results: Vec<EstimatorRecord> = counts
        .iter()
        .map(|&n| EstimatorRecord {
            cardinality: n,
            approx_sets: measure_error::<Estimator>(n),
            probabilistic_collections: measure_error::<ProbabilisticHyperLogLog>(n),
        })
        .collect();
    std::fs::write(
        format!("{}/relative_error.md", bench_results_path),
        Table::new(results).with(table_config).to_string(),
    )
    .unwrap();
}

/// Membership filter operations shared by the benchmarked implementations.
trait MembershipFilter {
    fn with_capacity(items: usize) -> Self;
    fn insert(&mut self, item: &String);
    fn contains(&self, item: &String) -> bool;
    fn name() -> String;
}

/// Distinct counting operations shared by the benchmarked implementations.
trait DistinctCounter {
    fn new() -> Self;
    fn update(&mut self, item: &u64);
    fn estimate(&mut self) -> f64;
    fn name() -> String;
}

fn items(n: usize, prefix: &str) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}-{i}")).collect()
}

fn bench_insert<F: MembershipFilter>(group: &mut BenchmarkGroup<WallTime>, n: usize) {
    let items = items(n, "user");
    group.bench_with_input(BenchmarkId::new(F::name(), n), &items, |b, items| {
        b.iter(|| {
            let mut filter = F::with_capacity(n);
            for item in items {
                filter.insert(black_box(item));
            }
        });
    });
}

fn bench_contains<F: MembershipFilter>(group: &mut BenchmarkGroup<WallTime>, n: usize) {
    let mut filter = F::with_capacity(n);
    for item in &items(n, "user") {
        filter.insert(item);
    }
    let probe = "user-absent".to_string();
    group.bench_with_input(BenchmarkId::new(F::name(), n), &probe, |b, probe| {
        b.iter(|| filter.contains(black_box(probe)));
    });
}

fn bench_update<E: DistinctCounter>(group: &mut BenchmarkGroup<WallTime>, n: usize) {
    group.bench_with_input(BenchmarkId::new(E::name(), n), &n, |b, &n| {
        b.iter(|| {
            let mut estimator = E::new();
            for i in 0..black_box(n as u64) {
                estimator.update(black_box(&i));
            }
        });
    });
}

fn bench_estimate<E: DistinctCounter>(group: &mut BenchmarkGroup<WallTime>, n: usize) {
    group.bench_with_input(BenchmarkId::new(E::name(), n), &n, |b, &n| {
        let mut estimator = E::new();
        for i in 0..black_box(n as u64) {
            estimator.update(black_box(&i));
        }
        b.iter(|| estimator.estimate());
    });
}

fn measure_fpp<F: MembershipFilter>(n: usize) -> String {
    let mut filter = F::with_capacity(n);
    for item in &items(n, "user") {
        filter.insert(item);
    }
    let false_positives = items(PROBES, "absent")
        .iter()
        .filter(|item| filter.contains(item))
        .count();
    format!("{:.4}", false_positives as f64 / PROBES as f64)
}

fn measure_allocations<E: DistinctCounter>(n: usize) -> String {
    let _profiler = dhat::Profiler::builder().testing().build();
    let mut estimator = E::new();
    for i in 0..n as u64 {
        estimator.update(&i);
    }
    let stats = dhat::HeapStats::get();
    format!(
        "{} / {} / {}",
        std::mem::size_of::<E>(),
        stats.total_bytes,
        stats.total_blocks,
    )
}

fn measure_error<E: DistinctCounter>(n: usize) -> String {
    let trials = 100;
    let mut total_relative_error: f64 = 0.0;
    let mut rng = StdRng::seed_from_u64(12345);
    for _ in 0..trials {
        let mut estimator = E::new();
        for _ in 0..n {
            estimator.update(&rng.gen());
        }
        let relative_error = if n == 0 {
            estimator.estimate()
        } else {
            (estimator.estimate() - n as f64).abs() / n as f64
        };
        total_relative_error += relative_error;
    }
    let avg_relative_error = total_relative_error / (trials as f64);

    if avg_relative_error < 1.0 {
        format!("{:.4}", avg_relative_error)
    } else {
        format!("{:.2e}", avg_relative_error)
    }
}

#[derive(Tabled)]
struct FilterRecord {
    items: usize,
    wyhash: String,
    double_hashing: String,
    sha256: String,
    probabilistic_collections: String,
}

#[derive(Tabled)]
struct EstimatorRecord {
    cardinality: usize,
    approx_sets: String,
    probabilistic_collections: String,
}

struct Bloom<S>(BloomFilter<HashFamily>, std::marker::PhantomData<S>);

/// Hash family labels for benchmark ids.
trait Family {
    fn family() -> HashFamily;
    fn label() -> &'static str;
}

impl Family for SeededWyHash {
    fn family() -> HashFamily {
        SeededWyHash { seed: DEFAULT_SEED }.into()
    }

    fn label() -> &'static str {
        "wyhash"
    }
}

impl Family for DoubleHashing {
    fn family() -> HashFamily {
        DoubleHashing { seed: DEFAULT_SEED }.into()
    }

    fn label() -> &'static str {
        "double-hashing"
    }
}

impl Family for SaltedSha256 {
    fn family() -> HashFamily {
        SaltedSha256.into()
    }

    fn label() -> &'static str {
        "sha256"
    }
}

impl<S: Family> MembershipFilter for Bloom<S> {
    fn with_capacity(items: usize) -> Self {
        let reference = BloomFilter::with_accuracy(items.max(1), FPP).unwrap();
        let filter =
            BloomFilter::with_hasher(reference.size(), reference.num_hashes(), S::family())
                .unwrap();
        Self(filter, std::marker::PhantomData)
    }

    fn insert(&mut self, item: &String) {
        self.0.insert(item.as_str());
    }

    fn contains(&self, item: &String) -> bool {
        self.0.contains(item.as_str())
    }

    fn name() -> String {
        format!("approx-sets/{}", S::label())
    }
}

struct ProbabilisticBloom(probabilistic_collections::bloom::BloomFilter<String>);

impl MembershipFilter for ProbabilisticBloom {
    fn with_capacity(items: usize) -> Self {
        Self(probabilistic_collections::bloom::BloomFilter::new(
            items.max(1),
            FPP,
        ))
    }

    fn insert(&mut self, item: &String) {
        self.0.insert(item);
    }

    fn contains(&self, item: &String) -> bool {
        self.0.contains(item)
    }

    fn name() -> String {
        "probabilistic-collections".to_string()
    }
}

struct Estimator(CardinalityEstimator);

impl DistinctCounter for Estimator {
    fn new() -> Self {
        Self(CardinalityEstimator::default())
    }

    fn update(&mut self, item: &u64) {
        self.0.update(item);
    }

    fn estimate(&mut self) -> f64 {
        self.0.estimate()
    }

    fn name() -> String {
        "approx-sets".to_string()
    }
}

struct ProbabilisticHyperLogLog(probabilistic_collections::hyperloglog::HyperLogLog<u64>);

impl DistinctCounter for ProbabilisticHyperLogLog {
    fn new() -> Self {
        Self(probabilistic_collections::hyperloglog::HyperLogLog::new(
            0.004,
        ))
    }

    fn update(&mut self, item: &u64) {
        self.0.insert(item);
    }

    fn estimate(&mut self) -> f64 {
        self.0.len()
    }

    fn name() -> String {
        "probabilistic-collections".to_string()
    }
}
